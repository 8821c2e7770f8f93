//! Class Name Inference - Derives target class names from association names

use serde::{Deserialize, Serialize};

/// Convention used to turn an association name into a class name
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingConvention {
    /// Singular PascalCase (projects -> Project)
    #[default]
    Classify,
    /// PascalCase without singularizing (projects -> Projects)
    Camelize,
    /// Custom pattern with a {name} placeholder for the classified name
    Custom(String),
}

impl NamingConvention {
    /// Derive the target class name for an association
    pub fn class_name_for(&self, association: &str) -> String {
        match self {
            NamingConvention::Classify => classify(association),
            NamingConvention::Camelize => to_pascal_case(association),
            NamingConvention::Custom(pattern) => pattern.replace("{name}", &classify(association)),
        }
    }
}

/// Singular PascalCase class name for an underscored identifier
pub fn classify(name: &str) -> String {
    to_pascal_case(&singularize(name))
}

/// Simple singularization (English-centric)
///
/// Irregular plurals are not handled (`buses` becomes `buse`); use an
/// explicit class name for those.
pub fn singularize(name: &str) -> String {
    if name.ends_with("ies") && name.len() > 3 {
        format!("{}y", &name[..name.len() - 3])
    } else if name.ends_with("sses")
        || name.ends_with("ches")
        || name.ends_with("shes")
        || name.ends_with("xes")
        || name.ends_with("zes")
    {
        name[..name.len() - 2].to_string()
    } else if name.ends_with('s') && !name.ends_with("ss") && name.len() > 1 {
        name[..name.len() - 1].to_string()
    } else {
        name.to_string()
    }
}

/// Convert an underscored identifier to PascalCase
pub fn to_pascal_case(s: &str) -> String {
    s.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singularize() {
        assert_eq!(singularize("projects"), "project");
        assert_eq!(singularize("categories"), "category");
        assert_eq!(singularize("addresses"), "address");
        assert_eq!(singularize("branches"), "branch");
        assert_eq!(singularize("cases"), "case");
        assert_eq!(singularize("releases"), "release");
        assert_eq!(singularize("boxes"), "box");
        assert_eq!(singularize("address"), "address");
        assert_eq!(singularize("profile"), "profile");
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("projects"), "Project");
        assert_eq!(classify("managed_project"), "ManagedProject");
        assert_eq!(classify("admin_projects"), "AdminProject");
    }

    #[test]
    fn test_conventions() {
        assert_eq!(NamingConvention::Classify.class_name_for("projects"), "Project");
        assert_eq!(NamingConvention::Camelize.class_name_for("projects"), "Projects");
        assert_eq!(
            NamingConvention::Custom("{name}Document".to_string()).class_name_for("profile"),
            "ProfileDocument"
        );
    }
}
