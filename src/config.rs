use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::calendar::{parse_date, HolidayAllowance, OverlapPolicy};

const CONFIG_FILE_NAME: &str = ".wweconfig.json";
const DEFAULT_REGION: &str = "england-and-wales";

/// 集計対象のクライアント。
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ClientConfig {
    /// Togglでのクライアント名
    pub name: String,
    /// 勤務開始日(`YYYY-MM-DD`)
    pub start_date: String,
}

/// 設定ファイルの内容。
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub toggl_token: Option<String>,
    /// `+01:00`形式のオフセット。省略時はローカルタイムゾーン
    #[serde(default)]
    pub timezone: Option<String>,
    pub client: ClientConfig,
    pub working_day_hours: f64,
    #[serde(default)]
    pub personal_holidays: Vec<HolidayAllowance>,
    #[serde(default)]
    pub company_bonus_days: Vec<HolidayAllowance>,
    #[serde(default = "default_region")]
    pub bank_holiday_region: String,
    #[serde(default)]
    pub holiday_overlap: OverlapPolicy,
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

impl Config {
    /// 設定ファイルを読み込む。
    ///
    /// `path`が指定されていない場合は`~/.wweconfig.json`を読み込む。
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => default_path()?,
        };
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_json(&text)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// JSON文字列から設定を読み込み、値を検証する。
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(text).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.working_day_hours < 0.0 || self.working_day_hours.is_nan() {
            bail!(
                "working_day_hours must not be negative: {}",
                self.working_day_hours
            );
        }
        let negative = self
            .personal_holidays
            .iter()
            .chain(self.company_bonus_days.iter())
            .find(|(_, amount)| *amount < 0.0 || amount.is_nan());
        if let Some((day, amount)) = negative {
            bail!("Holiday amount must not be negative: {} {}", day, amount);
        }
        Ok(())
    }

    /// 勤務開始日。
    pub fn start_date(&self) -> Result<NaiveDate> {
        parse_date(&self.client.start_date).context("Invalid client.start_date")
    }

    /// Toggl APIのトークン。
    ///
    /// 環境変数`TOGGL_API_TOKEN`が設定されている場合はそちらを優先する。
    pub fn toggl_token(&self) -> Result<String> {
        env::var("TOGGL_API_TOKEN")
            .ok()
            .or_else(|| self.toggl_token.clone())
            .context("toggl_token or TOGGL_API_TOKEN must be set")
    }
}

/// 設定ファイルの既定の場所。
fn default_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Failed to find home directory")?;
    Ok(home.join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use chrono::NaiveDate;
    use rstest::rstest;

    use super::{ClientConfig, Config};
    use crate::calendar::OverlapPolicy;

    const FULL_CONFIG: &str = r#"{
        "toggl_token": "870738agd54db0e63qfd943380ahbe8f",
        "timezone": "+00:00",
        "client": {"name": "ACME", "start_date": "2018-02-05"},
        "working_day_hours": 7.5,
        "personal_holidays": [["2018-11-07", 1], ["2018-11-08", 0.5]],
        "company_bonus_days": [["2018-12-24", 1]],
        "bank_holiday_region": "scotland",
        "holiday_overlap": "skip_weekend_holidays"
    }"#;

    #[test]
    fn test_from_json() {
        let config = Config::from_json(FULL_CONFIG).unwrap();

        assert_eq!(
            config,
            Config {
                toggl_token: Some("870738agd54db0e63qfd943380ahbe8f".to_string()),
                timezone: Some("+00:00".to_string()),
                client: ClientConfig {
                    name: "ACME".to_string(),
                    start_date: "2018-02-05".to_string(),
                },
                working_day_hours: 7.5,
                personal_holidays: vec![
                    ("2018-11-07".to_string(), 1.0),
                    ("2018-11-08".to_string(), 0.5),
                ],
                company_bonus_days: vec![("2018-12-24".to_string(), 1.0)],
                bank_holiday_region: "scotland".to_string(),
                holiday_overlap: OverlapPolicy::SkipWeekendHolidays,
            }
        );
        assert_eq!(
            config.start_date().unwrap(),
            NaiveDate::from_ymd_opt(2018, 2, 5).unwrap()
        );
    }

    #[test]
    fn test_from_json_defaults() {
        let config = Config::from_json(
            r#"{"client": {"name": "ACME", "start_date": "2018-02-05"}, "working_day_hours": 8}"#,
        )
        .unwrap();

        assert_eq!(config.toggl_token, None);
        assert_eq!(config.timezone, None);
        assert!(config.personal_holidays.is_empty());
        assert!(config.company_bonus_days.is_empty());
        assert_eq!(config.bank_holiday_region, "england-and-wales");
        assert_eq!(config.holiday_overlap, OverlapPolicy::CountIndependently);
    }

    #[rstest]
    #[case::negative_hours(
        r#"{"client": {"name": "ACME", "start_date": "2018-02-05"}, "working_day_hours": -1}"#
    )]
    #[case::negative_holiday(
        r#"{"client": {"name": "ACME", "start_date": "2018-02-05"}, "working_day_hours": 8,
            "personal_holidays": [["2018-11-07", -1]]}"#
    )]
    #[case::missing_client(r#"{"working_day_hours": 8}"#)]
    #[case::holiday_not_a_pair(
        r#"{"client": {"name": "ACME", "start_date": "2018-02-05"}, "working_day_hours": 8,
            "personal_holidays": ["2018-11-07"]}"#
    )]
    fn test_from_json_invalid(#[case] text: &str) {
        assert!(Config::from_json(text).is_err());
    }

    #[test]
    fn test_start_date_malformed() {
        let config = Config::from_json(
            r#"{"client": {"name": "ACME", "start_date": "05/02/2018"}, "working_day_hours": 8}"#,
        )
        .unwrap();

        assert!(config.start_date().is_err());
    }

    #[test]
    fn test_load_from_path() {
        let path = std::env::temp_dir().join(format!("wweconfig-{}.json", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(FULL_CONFIG.as_bytes()).unwrap();

        let config = Config::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.client.name, "ACME");
    }

    #[test]
    fn test_load_missing_file() {
        let path = std::env::temp_dir().join("wweconfig-does-not-exist.json");

        assert!(Config::load(Some(&path)).is_err());
    }
}
