use std::sync::Arc;

use shared_config::AppConfig;

pub struct TestConfig {
    pub no_answer_timeout_seconds: u64,
    pub low_balance_timeout_seconds: u64,
    pub currency_symbol: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            no_answer_timeout_seconds: 20,
            low_balance_timeout_seconds: 30,
            currency_symbol: "₹".to_string(),
        }
    }
}

impl TestConfig {
    /// Timeouts short enough to run against the real clock.
    pub fn compressed() -> Self {
        Self {
            no_answer_timeout_seconds: 1,
            low_balance_timeout_seconds: 2,
            ..Self::default()
        }
    }

    pub fn with_timeouts(no_answer_seconds: u64, low_balance_seconds: u64) -> Self {
        Self {
            no_answer_timeout_seconds: no_answer_seconds,
            low_balance_timeout_seconds: low_balance_seconds,
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            no_answer_timeout_seconds: self.no_answer_timeout_seconds,
            low_balance_timeout_seconds: self.low_balance_timeout_seconds,
            currency_symbol: self.currency_symbol.clone(),
            server_port: 0,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestCounterpart {
    pub doctor_id: String,
    pub name: String,
    pub photo_url: String,
    pub specialization: String,
    pub rate_per_minute: u64,
}

impl Default for TestCounterpart {
    fn default() -> Self {
        Self::doctor("Dr. Asha Menon", 20)
    }
}

impl TestCounterpart {
    pub fn doctor(name: &str, rate_per_minute: u64) -> Self {
        Self {
            doctor_id: format!("doc-{}", name.to_lowercase().replace([' ', '.'], "")),
            name: name.to_string(),
            photo_url: "https://images.example.com/doctors/placeholder.jpg".to_string(),
            specialization: "General Physician".to_string(),
            rate_per_minute,
        }
    }
}
