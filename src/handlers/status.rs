use serde::Serialize;

use crate::config::{Credentials, TABLE_NAME};

/// Configuration diagnostics. Only presence flags and lengths are reported, never values.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub success: bool,
    pub configured: bool,
    pub message: String,
    pub api_key_set: bool,
    pub api_key_length: usize,
    pub base_id_set: bool,
    pub base_id_length: usize,
    pub env_file_found: bool,
    pub http_client_available: bool,
    pub table_name: &'static str,
    pub version: &'static str,
}

/// Builds the status report. Makes no outbound call.
pub fn report(credentials: &Credentials) -> StatusReport {
    let configured = credentials.is_configured();
    let message = if configured {
        "Airtable configuration found".to_string()
    } else {
        format!(
            "Missing environment variables: {}",
            credentials.missing_vars().join(", ")
        )
    };

    StatusReport {
        success: configured,
        configured,
        message,
        api_key_set: credentials.api_key().is_some(),
        api_key_length: credentials.api_key().map_or(0, str::len),
        base_id_set: credentials.base_id().is_some(),
        base_id_length: credentials.base_id().map_or(0, str::len),
        env_file_found: credentials.env_file_found(),
        // reqwest is linked in unconditionally
        http_client_available: true,
        table_name: TABLE_NAME,
        version: env!("CARGO_PKG_VERSION"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{API_KEY_VAR, BASE_ID_VAR};

    #[test]
    fn unconfigured_report_names_both_variables() {
        let report = report(&Credentials::default());

        assert!(!report.success);
        assert!(!report.configured);
        assert!(report.message.contains(API_KEY_VAR));
        assert!(report.message.contains(BASE_ID_VAR));
        assert_eq!(report.api_key_length, 0);
        assert_eq!(report.base_id_length, 0);
    }

    #[test]
    fn partially_configured_report_names_only_missing_variable() {
        let report = report(&Credentials::new(Some("pat".into()), None));

        assert!(!report.configured);
        assert!(report.api_key_set);
        assert!(!report.message.contains(API_KEY_VAR));
        assert!(report.message.contains(BASE_ID_VAR));
    }

    #[test]
    fn configured_report_exposes_lengths_only() {
        let creds = Credentials::new(Some("patSECRET.1234".into()), Some("appXYZ".into()));
        let report = report(&creds);
        let rendered = serde_json::to_string(&report).unwrap();

        assert!(report.success && report.configured);
        assert_eq!(report.api_key_length, 14);
        assert_eq!(report.base_id_length, 6);
        assert!(!rendered.contains("patSECRET.1234"));
        assert!(!rendered.contains("appXYZ"));
    }
}
