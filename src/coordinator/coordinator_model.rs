use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::accounts::Account;
use crate::constants::UNKNOWN_PLATFORM_GROUP;
use crate::errors::{Error, Result, ValidationError};
use crate::platforms::{Platform, PlatformType};

/// Everything the UI layer consumes, recombined from the store's
/// observable lists. Latest value wins; a fresh copy is published on the
/// watch channel after every change.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub platforms: Vec<Platform>,
    pub accounts: Vec<Account>,
    /// Accounts grouped by platform name, in first-encounter order of the
    /// newest-first account list
    pub grouped_accounts: Vec<(String, Vec<Account>)>,
    /// Distinct platform types currently in use
    pub platform_types: Vec<PlatformType>,
    /// Active search keyword; empty means "show all"
    pub search_keyword: String,
    pub search_results: Vec<Account>,
    pub grouped_search_results: Vec<(String, Vec<Account>)>,
    /// Active type filter; None means "all"
    pub type_filter: Option<PlatformType>,
    pub is_loading: bool,
    pub error_message: Option<String>,
    pub status_message: Option<String>,
}

/// Input for the save-account-with-platform flow: the platform is looked
/// up by name and created on demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCredential {
    pub platform_name: String,
    pub platform_type: Option<PlatformType>,
    pub remark: Option<String>,
    pub login_name: Option<String>,
    pub password: String,
    pub pay_password: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub id_number: Option<String>,
}

impl NewCredential {
    pub fn validate(&self) -> Result<()> {
        if self.platform_name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "platform name".to_string(),
            )));
        }
        if self.password.is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "password".to_string(),
            )));
        }
        Ok(())
    }
}

/// Groups accounts by their platform's name, preserving the order of the
/// account list. Accounts whose platform row is missing fall into a fixed
/// "unknown" group.
pub fn group_by_platform(
    accounts: &[Account],
    platforms: &[Platform],
) -> Vec<(String, Vec<Account>)> {
    let name_by_id: HashMap<i32, &str> = platforms
        .iter()
        .map(|p| (p.id, p.name.as_str()))
        .collect();

    let mut groups: Vec<(String, Vec<Account>)> = Vec::new();
    for account in accounts {
        let name = name_by_id
            .get(&account.platform_id)
            .copied()
            .unwrap_or(UNKNOWN_PLATFORM_GROUP);
        match groups.iter_mut().find(|(n, _)| n.as_str() == name) {
            Some((_, members)) => members.push(account.clone()),
            None => groups.push((name.to_string(), vec![account.clone()])),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(id: i32, platform_id: i32) -> Account {
        Account {
            id,
            platform_id,
            password: "pw".to_string(),
            ..Default::default()
        }
    }

    fn platform(id: i32, name: &str) -> Platform {
        Platform {
            id,
            name: name.to_string(),
            platform_type: None,
            sort_index: 0,
        }
    }

    #[test]
    fn groups_preserve_account_order() {
        let platforms = vec![platform(1, "mail"), platform(2, "bank")];
        let accounts = vec![account(30, 2), account(20, 1), account(10, 2)];

        let groups = group_by_platform(&accounts, &platforms);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "bank");
        assert_eq!(
            groups[0].1.iter().map(|a| a.id).collect::<Vec<_>>(),
            vec![30, 10]
        );
        assert_eq!(groups[1].0, "mail");
    }

    #[test]
    fn missing_platform_falls_into_unknown_group() {
        let groups = group_by_platform(&[account(1, 99)], &[]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].0, UNKNOWN_PLATFORM_GROUP);
    }

    #[test]
    fn credential_serializes_with_camel_case_keys() {
        let input = NewCredential {
            platform_name: "mail".to_string(),
            platform_type: Some(PlatformType::Social),
            remark: None,
            login_name: Some("alice".to_string()),
            password: "secret".to_string(),
            pay_password: None,
            phone: None,
            email: None,
            id_number: None,
        };

        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["platformName"], "mail");
        assert_eq!(json["platformType"], "social");
        assert_eq!(json["loginName"], "alice");
    }

    #[test]
    fn credential_requires_name_and_password() {
        let mut input = NewCredential {
            platform_name: "mail".to_string(),
            platform_type: None,
            remark: None,
            login_name: None,
            password: "secret".to_string(),
            pay_password: None,
            phone: None,
            email: None,
            id_number: None,
        };
        assert!(input.validate().is_ok());

        input.password = String::new();
        assert!(input.validate().is_err());

        input.password = "secret".to_string();
        input.platform_name = " ".to_string();
        assert!(input.validate().is_err());
    }
}
