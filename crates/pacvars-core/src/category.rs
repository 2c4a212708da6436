//! Variable categories and their static properties.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PacError;

/// Base value type of a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseType {
    Integer,
    Float,
    String,
    /// Integer 0/1 on the wire, `bool` locally.
    Boolean,
}

/// Variable category, selected by a name prefix.
///
/// Serialized by name and parsed case-insensitively, like [`FromStr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Category {
    AnalogInput,
    AnalogOutput,
    BooleanScalar,
    BooleanTable,
    DigitalInput,
    DigitalOutput,
    DownTimer,
    Float,
    FloatTable,
    Integer,
    IntegerTable,
    String,
    StringTable,
    UpTimer,
}

impl Category {
    /// All categories, in declaration order.
    pub const ALL: [Category; 14] = [
        Category::AnalogInput,
        Category::AnalogOutput,
        Category::BooleanScalar,
        Category::BooleanTable,
        Category::DigitalInput,
        Category::DigitalOutput,
        Category::DownTimer,
        Category::Float,
        Category::FloatTable,
        Category::Integer,
        Category::IntegerTable,
        Category::String,
        Category::StringTable,
        Category::UpTimer,
    ];

    pub fn base_type(&self) -> BaseType {
        match self {
            Category::AnalogInput | Category::AnalogOutput => BaseType::Float,
            Category::Float | Category::FloatTable => BaseType::Float,
            Category::DigitalInput | Category::DigitalOutput => BaseType::Boolean,
            Category::BooleanScalar | Category::BooleanTable => BaseType::Boolean,
            Category::DownTimer | Category::UpTimer => BaseType::Float,
            Category::Integer | Category::IntegerTable => BaseType::Integer,
            Category::String | Category::StringTable => BaseType::String,
        }
    }

    pub fn is_table(&self) -> bool {
        matches!(
            self,
            Category::BooleanTable
                | Category::FloatTable
                | Category::IntegerTable
                | Category::StringTable
        )
    }

    /// Timers and inputs are maintained by the strategy and cannot be written.
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            Category::UpTimer | Category::DownTimer | Category::AnalogInput | Category::DigitalInput
        )
    }

    /// True when the category is an integer overlay exposed as booleans.
    pub fn is_boolean(&self) -> bool {
        matches!(self, Category::BooleanScalar | Category::BooleanTable)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::AnalogInput => "AnalogInput",
            Category::AnalogOutput => "AnalogOutput",
            Category::BooleanScalar => "BooleanScalar",
            Category::BooleanTable => "BooleanTable",
            Category::DigitalInput => "DigitalInput",
            Category::DigitalOutput => "DigitalOutput",
            Category::DownTimer => "DownTimer",
            Category::Float => "Float",
            Category::FloatTable => "FloatTable",
            Category::Integer => "Integer",
            Category::IntegerTable => "IntegerTable",
            Category::String => "String",
            Category::StringTable => "StringTable",
            Category::UpTimer => "UpTimer",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = PacError;

    /// Case-insensitive, so `integertable` and `IntegerTable` both parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PacError::Config(format!("Unknown category: {}", s)))
    }
}

impl TryFrom<String> for Category {
    type Error = PacError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_only_set() {
        let read_only: Vec<_> = Category::ALL.iter().filter(|c| c.is_read_only()).collect();
        assert_eq!(read_only.len(), 4);
        assert!(Category::AnalogInput.is_read_only());
        assert!(!Category::AnalogOutput.is_read_only());
    }

    #[test]
    fn test_table_flags() {
        assert!(Category::BooleanTable.is_table());
        assert!(!Category::BooleanScalar.is_table());
        assert_eq!(Category::BooleanTable.base_type(), BaseType::Boolean);
    }

    #[test]
    fn test_parse_category() {
        assert_eq!("integerTable".parse::<Category>().unwrap(), Category::IntegerTable);
        assert_eq!("UpTimer".parse::<Category>().unwrap(), Category::UpTimer);
        assert!("Int64".parse::<Category>().is_err());
    }

    #[test]
    fn test_serde_by_name() {
        let parsed: Category = serde_json::from_str("\"analogoutput\"").unwrap();
        assert_eq!(parsed, Category::AnalogOutput);
        assert_eq!(
            serde_json::to_string(&Category::IntegerTable).unwrap(),
            "\"IntegerTable\""
        );
        assert!(serde_json::from_str::<Category>("\"Int64\"").is_err());
    }
}
