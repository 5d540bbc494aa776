//! INI file configuration adapter.
//!
//! Section and key names are case-sensitive so strategy parameter names
//! such as `contributionAmount` survive intact.

use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new_cs();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new_cs();
        config.read(content.to_string())?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_section(&self, section: &str) -> BTreeMap<String, String> {
        self.config
            .get_map_ref()
            .get(section)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|(k, v)| v.as_ref().map(|v| (k.clone(), v.clone())))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    const SAMPLE: &str = r#"
[backtest]
symbol = SPY
start_date = 2020-01-01
end_date = 2024-12-31
initial_capital = 10000
strategies = BUY_AND_HOLD, DCA

[DCA]
contributionAmount = 500
frequencyDays = 21

[data]
source = csv
max_attempts = 3
"#;

    #[test]
    fn from_string_parses_config() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_string("backtest", "symbol"), Some("SPY".to_string()));
        assert_eq!(
            adapter.get_string("backtest", "strategies"),
            Some("BUY_AND_HOLD, DCA".to_string())
        );
    }

    #[test]
    fn keys_are_case_sensitive() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(
            adapter.get_string("DCA", "contributionAmount"),
            Some("500".to_string())
        );
        assert_eq!(adapter.get_string("DCA", "contributionamount"), None);
        assert_eq!(adapter.get_string("dca", "contributionAmount"), None);
    }

    #[test]
    fn get_section_returns_all_pairs() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        let section = adapter.get_section("DCA");
        assert_eq!(section.len(), 2);
        assert_eq!(section["contributionAmount"], "500");
        assert_eq!(section["frequencyDays"], "21");
    }

    #[test]
    fn get_section_missing_is_empty() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert!(adapter.get_section("MA_CROSSOVER").is_empty());
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_string("backtest", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_int_returns_value_or_default() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_int("data", "max_attempts", 0), 3);
        assert_eq!(adapter.get_int("data", "missing", 42), 42);
        assert_eq!(adapter.get_int("data", "source", 7), 7);
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[web]\nlisten = 0.0.0.0:9000\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("web", "listen"),
            Some("0.0.0.0:9000".to_string())
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/config.ini");
        assert!(result.is_err());
    }
}
