//! Named statement parameters.
//!
//! SQLite names a parameter with its prefix character: `:name`, `@name` and
//! `$name` are three distinct parameters. A name given here without one of
//! these prefixes is bound as `:name`, the form most SQL is written in.
//!
//! ```rust,ignore
//! use hrana_client::{NamedParam, ToParams};
//! use hrana_types::TypeError;
//!
//! struct NewUser {
//!     name: String,
//!     email: String,
//! }
//!
//! impl ToParams for NewUser {
//!     fn to_params(&self) -> Result<Vec<NamedParam>, TypeError> {
//!         Ok(vec![
//!             NamedParam::from_value("name", &self.name)?,
//!             NamedParam::from_value("email", &self.email)?,
//!         ])
//!     }
//! }
//!
//! conn.execute_named(
//!     "INSERT INTO users (name, email) VALUES (:name, :email)",
//!     &user,
//! ).await?;
//! ```

use hrana_types::{SqlValue, ToSql, TypeError};

/// Prefix characters SQLite accepts for named parameters.
const NAME_PREFIXES: [char; 3] = [':', '@', '$'];

fn qualify(name: String) -> String {
    if name.starts_with(NAME_PREFIXES) {
        name
    } else {
        format!(":{name}")
    }
}

/// A named statement parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedParam {
    /// Parameter name, prefix included.
    pub name: String,
    /// Parameter value.
    pub value: SqlValue,
}

impl NamedParam {
    /// Create a named parameter, prefixing a bare name with `:`.
    pub fn new<S: Into<String>>(name: S, value: SqlValue) -> Self {
        Self {
            name: qualify(name.into()),
            value,
        }
    }

    /// Create a named parameter from a value implementing ToSql.
    pub fn from_value<S: Into<String>, T: ToSql + ?Sized>(
        name: S,
        value: &T,
    ) -> Result<Self, TypeError> {
        Ok(Self::new(name, value.to_sql()?))
    }

    /// The prefix character (`:`, `@` or `$`).
    #[must_use]
    pub fn prefix(&self) -> char {
        self.name.chars().next().unwrap_or(':')
    }

    /// The name without its prefix.
    #[must_use]
    pub fn bare_name(&self) -> &str {
        self.name.get(1..).unwrap_or_default()
    }
}

/// Trait for types that can be converted to named statement parameters.
pub trait ToParams {
    /// Convert this value to named parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if any field value cannot be converted to a SQL value.
    fn to_params(&self) -> Result<Vec<NamedParam>, TypeError>;
}

impl ToParams for [NamedParam] {
    fn to_params(&self) -> Result<Vec<NamedParam>, TypeError> {
        Ok(self.to_vec())
    }
}

/// Named parameters keyed by their prefixed name.
///
/// Binding a name twice keeps the later value in the earlier position, so
/// each SQLite parameter is sent at most once.
#[derive(Debug, Clone, Default)]
pub struct ParamList {
    params: Vec<NamedParam>,
}

impl ParamList {
    /// Create a new empty parameter list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `value` to `name`, replacing an earlier binding of the same name.
    pub fn add<S: Into<String>, T: ToSql + ?Sized>(
        &mut self,
        name: S,
        value: &T,
    ) -> Result<(), TypeError> {
        self.set(NamedParam::from_value(name, value)?);
        Ok(())
    }

    /// Insert a parameter, replacing an earlier binding of the same name.
    pub fn set(&mut self, param: NamedParam) {
        match self.params.iter_mut().find(|p| p.name == param.name) {
            Some(existing) => existing.value = param.value,
            None => self.params.push(param),
        }
    }

    /// Look up a bound value. A bare name is looked up as `:name`.
    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        let name = qualify(name.to_string());
        self.params.iter().find(|p| p.name == name).map(|p| &p.value)
    }

    /// Get the number of parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Iterate over the parameters in binding order.
    pub fn iter(&self) -> impl Iterator<Item = &NamedParam> {
        self.params.iter()
    }
}

impl ToParams for ParamList {
    fn to_params(&self) -> Result<Vec<NamedParam>, TypeError> {
        Ok(self.params.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    struct NewUser {
        name: String,
        age: i32,
    }

    impl ToParams for NewUser {
        fn to_params(&self) -> Result<Vec<NamedParam>, TypeError> {
            Ok(vec![
                NamedParam::from_value("name", &self.name)?,
                NamedParam::from_value("@age", &self.age)?,
            ])
        }
    }

    #[test]
    fn test_to_params_manual_impl() {
        let user = NewUser {
            name: "Alice".to_string(),
            age: 30,
        };

        let params = user.to_params().unwrap();
        assert_eq!(params[0].name, ":name");
        assert_eq!(params[1].name, "@age");
        assert_eq!(params[1].prefix(), '@');
        assert_eq!(params[1].bare_name(), "age");
    }

    #[test]
    fn test_prefixes_kept() {
        for name in [":a", "@a", "$a"] {
            let param = NamedParam::new(name, SqlValue::Null);
            assert_eq!(param.name, name);
            assert_eq!(param.bare_name(), "a");
        }
        assert_eq!(NamedParam::new("a", SqlValue::Null).prefix(), ':');
    }

    #[test]
    fn test_named_param_rejects_unsigned_overflow() {
        assert!(NamedParam::from_value("big", &u64::MAX).is_err());
    }

    #[test]
    fn test_param_list_rebinding_replaces_in_place() {
        let mut list = ParamList::new();
        list.add("id", &1i64).unwrap();
        list.add("@id", &2i64).unwrap();
        list.add(":id", &3i64).unwrap();

        assert_eq!(list.len(), 2);
        assert_eq!(list.get("id"), Some(&SqlValue::Integer(3)));
        assert_eq!(list.get("@id"), Some(&SqlValue::Integer(2)));
        assert_eq!(list.get("$id"), None);

        let names: Vec<&str> = list.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec![":id", "@id"]);
    }

    #[test]
    fn test_slice_to_params() {
        let params = [NamedParam::new("a", SqlValue::Integer(1))];
        assert_eq!(params[..].to_params().unwrap(), params.to_vec());
    }
}
