#![deny(missing_docs)]

//! # Path Rules

use super::{LintRule, LintViolation};
use crate::contract::Contract;
use crate::error::AppResult;
use crate::table::TypeTable;

/// `no-trailing-forward-slash`: `/users/` and `/users` should not both be plausible.
pub struct NoTrailingForwardSlash;

impl LintRule for NoTrailingForwardSlash {
    fn name(&self) -> &'static str {
        "no-trailing-forward-slash"
    }

    fn check(&self, contract: &Contract, _table: &TypeTable) -> AppResult<Vec<LintViolation>> {
        Ok(contract
            .endpoints
            .iter()
            .filter(|e| e.path.len() > 1 && e.path.ends_with('/'))
            .map(|e| {
                self.violation(
                    format!("endpoint {}", e.name),
                    format!("path '{}' ends with a forward slash", e.path),
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TypeTableBuilder;

    #[test]
    fn test_root_path_is_allowed() {
        let contract = Contract::from_yaml_str(
            r#"
name: Paths
endpoints:
  - { name: root, method: GET, path: /, responses: [] }
  - { name: users, method: GET, path: /users/, responses: [] }
"#,
        )
        .unwrap();
        let table = TypeTableBuilder::new().build().unwrap();
        let found = NoTrailingForwardSlash.check(&contract, &table).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].location, "endpoint users");
    }
}
