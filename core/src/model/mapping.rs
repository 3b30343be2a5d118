use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::MergeError;
use crate::model::coordinate::normalize_column;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Activity {
    /// Duration column in the month sheets, e.g. "E".
    pub column: String,
    pub name: String,
    pub alias: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub activities: Vec<Activity>,
}

/// Alias to duration column table. Built once, read-only afterwards.
#[derive(Debug, Clone)]
pub struct ActivityMapping {
    projects: Vec<Project>,
    columns: HashMap<String, String>,
}

impl ActivityMapping {
    pub fn new(projects: Vec<Project>) -> Result<Self> {
        let mut columns = HashMap::new();
        for project in &projects {
            for activity in &project.activities {
                let column = normalize_column(&activity.column)
                    .with_context(|| format!("Invalid activity '{}'", activity.alias))?;
                if columns.insert(activity.alias.clone(), column).is_some() {
                    return Err(anyhow!("Alias '{}' is mapped more than once", activity.alias));
                }
            }
        }
        Ok(Self { projects, columns })
    }

    /// Reads a JSON array of projects.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Could not open activity mapping {}", path.display()))?;
        let projects: Vec<Project> = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Invalid activity mapping {}", path.display()))?;
        Self::new(projects)
    }

    pub fn builtin() -> Self {
        let projects = BUILTIN_PROJECTS
            .iter()
            .map(|(id, name, activities)| Project {
                id: id.to_string(),
                name: name.to_string(),
                activities: activities
                    .iter()
                    .map(|(column, name, alias)| Activity {
                        column: column.to_string(),
                        name: name.to_string(),
                        alias: alias.to_string(),
                    })
                    .collect(),
            })
            .collect();
        let columns = BUILTIN_PROJECTS
            .iter()
            .flat_map(|(_, _, activities)| activities.iter())
            .map(|(column, _, alias)| (alias.to_string(), column.to_string()))
            .collect();
        Self { projects, columns }
    }

    pub fn duration_column(&self, alias: &str) -> Result<&str> {
        self.columns
            .get(alias)
            .map(String::as_str)
            .ok_or_else(|| MergeError::UnknownAlias(alias.to_string()).into())
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }
}

type BuiltinActivity = (&'static str, &'static str, &'static str);
type BuiltinProject = (&'static str, &'static str, &'static [BuiltinActivity]);

const BUILTIN_PROJECTS: &[BuiltinProject] = &[
    (
        "A",
        "Development",
        &[
            ("E", "Website", "petzi_dev_website"),
            ("F", "PeliScan", "petzi_dev_peliscan"),
            ("G", "Other", "petzi_dev_other"),
        ],
    ),
    ("B", "Infra", &[("O", "Infra", "petzi_infra")]),
    (
        "C",
        "Support",
        &[("V", "1st level", "petzi_sup_1"), ("W", "2nd level", "petzi_sup_2")],
    ),
    ("D", "Workgroup", &[("AC", "Workgroup", "petzi_workgroup")]),
    (
        "E",
        "Travel",
        &[
            ("AM", "Meetings", "petzi_travel_meetings"),
            ("AN", "Other", "petzi_travel_other"),
        ],
    ),
    (
        "F",
        "Misc",
        &[("AS", "Admin", "petzi_misc_admin"), ("AT", "Other", "petzi_misc_other")],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn project(aliases: &[(&str, &str)]) -> Project {
        Project {
            id: "A".to_string(),
            name: "Development".to_string(),
            activities: aliases
                .iter()
                .map(|(column, alias)| Activity {
                    column: column.to_string(),
                    name: alias.to_string(),
                    alias: alias.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_builtin_table() {
        let mapping = ActivityMapping::builtin();
        assert_eq!(mapping.projects().len(), 6);
        assert_eq!(mapping.duration_column("petzi_dev_website").unwrap(), "E");
        assert_eq!(mapping.duration_column("petzi_workgroup").unwrap(), "AC");
        assert_eq!(mapping.duration_column("petzi_misc_other").unwrap(), "AT");
    }

    #[test]
    fn test_unknown_alias_is_a_merge_error() {
        let mapping = ActivityMapping::builtin();
        let err = mapping.duration_column("nope").unwrap_err();
        assert_eq!(
            err.downcast_ref::<MergeError>(),
            Some(&MergeError::UnknownAlias("nope".to_string()))
        );
    }

    #[test]
    fn test_rejects_duplicate_alias_and_bad_column() {
        assert!(ActivityMapping::new(vec![project(&[("A", "x"), ("B", "x")])]).is_err());
        assert!(ActivityMapping::new(vec![project(&[("A1", "x")])]).is_err());
        let mapping = ActivityMapping::new(vec![project(&[("be", "x")])]).unwrap();
        assert_eq!(mapping.duration_column("x").unwrap(), "BE");
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id":"A","name":"Dev","activities":[{{"column":"A","name":"Web","alias":"dev_website"}}]}}]"#
        )
        .unwrap();

        let mapping = ActivityMapping::from_json_file(file.path()).unwrap();
        assert_eq!(mapping.duration_column("dev_website").unwrap(), "A");
        assert_eq!(mapping.projects()[0].activities[0].name, "Web");
    }
}
