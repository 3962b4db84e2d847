//! Parameterized SQL command construction.
//!
//! A [`Command`] pairs a SQL template with an ordered list of argument
//! values. Each `{}` hole in the template becomes a distinct named
//! parameter bound to the corresponding value, so argument text never
//! enters the SQL string itself.

use rusqlite::types::Value;
use rusqlite::ToSql;

use crate::error::{Error, Result};

/// A SQL template plus the values bound to its placeholders.
///
/// The template contains one `{}` hole per argument, matched positionally.
/// Rendering replaces hole `i` with the named parameter `:pi` and binds the
/// corresponding value to it; a `Value::Null` argument (for example from an
/// absent `Option`) is bound as SQL NULL. This is the only way values reach
/// the database, so a value containing quote characters or SQL keywords can
/// never change the statement's structure.
///
/// # Examples
///
/// ```
/// use catchup::Command;
///
/// let command = Command::new("INSERT INTO person (email, full_name) VALUES ({}, {})")
///     .arg("bruce@example.com".to_string())
///     .arg("Bruce Wayne".to_string());
/// ```
#[derive(Debug, Clone)]
pub struct Command {
    template: String,
    args: Vec<Value>,
}

impl Command {
    /// Creates a command from a SQL template.
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            args: Vec::new(),
        }
    }

    /// Appends one argument value, filling the next `{}` hole in order.
    ///
    /// # Examples
    ///
    /// ```
    /// use catchup::Command;
    ///
    /// // An absent optional field binds as SQL NULL.
    /// let command = Command::new("UPDATE person SET favorite_color = {} WHERE id = {}")
    ///     .arg(None::<String>)
    ///     .arg(42);
    /// ```
    #[must_use]
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Renders the template into executable SQL and its bound parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParameterMismatch`] if the number of `{}` holes does
    /// not equal the number of supplied arguments.
    pub(crate) fn render(&self) -> Result<Rendered> {
        let parts: Vec<&str> = self.template.split("{}").collect();
        let holes = parts.len() - 1;
        if holes != self.args.len() {
            return Err(Error::ParameterMismatch {
                holes,
                values: self.args.len(),
            });
        }

        let mut sql = String::with_capacity(self.template.len() + holes * 4);
        let mut params = Vec::with_capacity(holes);
        for (index, part) in parts.iter().enumerate() {
            sql.push_str(part);
            if index < holes {
                let name = format!(":p{index}");
                sql.push_str(&name);
                params.push((name, self.args[index].clone()));
            }
        }

        Ok(Rendered { sql, params })
    }
}

/// A rendered command: final SQL text plus named parameter bindings.
#[derive(Debug)]
pub(crate) struct Rendered {
    pub(crate) sql: String,
    pub(crate) params: Vec<(String, Value)>,
}

impl Rendered {
    /// Borrows the bindings in the form rusqlite's named-parameter API takes.
    pub(crate) fn param_refs(&self) -> Vec<(&str, &dyn ToSql)> {
        self.params
            .iter()
            .map(|(name, value)| (name.as_str(), value as &dyn ToSql))
            .collect()
    }
}
