use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use log::info;
#[cfg(test)]
use mockall::automock;
use reqwest::Client;
use serde::Deserialize;

use crate::calendar::parse_date;
use crate::error::{BalanceError, Result};

/// 祝日カレンダーを提供するtrait。
#[cfg_attr(test, automock)]
pub trait PublicHolidaySource {
    /// 指定した地域の祝日を全て返す。
    ///
    /// # Arguments
    ///
    /// * `region` - 地域名。GOV.UKの場合は`england-and-wales`など
    async fn holidays(&mut self, region: &str) -> Result<HashSet<NaiveDate>>;
}

/// GOV.UKのレスポンスの地域ごとの情報。
#[derive(Debug, Deserialize)]
struct GovUkDivision {
    events: Vec<GovUkEvent>,
}

#[derive(Debug, Deserialize)]
struct GovUkEvent {
    date: String,
}

/// GOV.UKのAPIからイギリスの祝日(bank holiday)を取得するクライアント。
pub struct GovUkBankHolidays {
    client: Client,
    api_url: String,
}

impl GovUkBankHolidays {
    /// 新しい`GovUkBankHolidays`を返す。
    pub fn new() -> Self {
        Self::with_api_url("https://www.gov.uk/bank-holidays.json")
    }

    /// 取得先のURLを指定して`GovUkBankHolidays`を返す。
    pub fn with_api_url(api_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.to_string(),
        }
    }
}

impl PublicHolidaySource for GovUkBankHolidays {
    async fn holidays(&mut self, region: &str) -> Result<HashSet<NaiveDate>> {
        info!("Fetching bank holidays from {}", self.api_url);
        let mut divisions = self
            .client
            .get(&self.api_url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| BalanceError::HolidaySource(e.to_string()))?
            .json::<HashMap<String, GovUkDivision>>()
            .await
            .map_err(|e| BalanceError::HolidaySource(e.to_string()))?;

        let division = divisions
            .remove(region)
            .ok_or_else(|| BalanceError::HolidaySource(format!("Unknown region: {}", region)))?;

        division
            .events
            .iter()
            .map(|event| {
                parse_date(&event.date).map_err(|e| BalanceError::HolidaySource(e.to_string()))
            })
            .collect()
    }
}

/// 地域ごとの祝日を1度だけ取得し、以降は保持した結果を返す。
pub struct CachedHolidaySource<S: PublicHolidaySource> {
    source: S,
    cache: HashMap<String, HashSet<NaiveDate>>,
}

impl<S: PublicHolidaySource> CachedHolidaySource<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: HashMap::new(),
        }
    }
}

impl<S: PublicHolidaySource> PublicHolidaySource for CachedHolidaySource<S> {
    async fn holidays(&mut self, region: &str) -> Result<HashSet<NaiveDate>> {
        if let Some(holidays) = self.cache.get(region) {
            return Ok(holidays.clone());
        }
        let holidays = self.source.holidays(region).await?;
        self.cache.insert(region.to_string(), holidays.clone());
        Ok(holidays)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::NaiveDate;
    use once_cell::sync::Lazy;
    use serde_json::json;

    use super::{CachedHolidaySource, GovUkBankHolidays, MockPublicHolidaySource};
    use super::PublicHolidaySource;
    use crate::error::BalanceError;

    /// GOV.UKのレスポンスを一部抜き出したもの。
    static BANK_HOLIDAYS: Lazy<String> = Lazy::new(|| {
        json!({
            "england-and-wales": {
                "division": "england-and-wales",
                "events": [
                    {"title": "Good Friday", "date": "2018-03-30", "notes": "", "bunting": false},
                    {"title": "Easter Monday", "date": "2018-04-02", "notes": "", "bunting": true},
                ]
            },
            "scotland": {
                "division": "scotland",
                "events": [
                    {"title": "2nd January", "date": "2018-01-02", "notes": "", "bunting": true},
                ]
            }
        })
        .to_string()
    });

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_gov_uk_holidays() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/bank-holidays.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(BANK_HOLIDAYS.as_str())
            .create_async()
            .await;

        let mut source =
            GovUkBankHolidays::with_api_url(&format!("{}/bank-holidays.json", server.url()));
        let holidays = source.holidays("england-and-wales").await.unwrap();

        mock.assert_async().await;
        assert_eq!(
            holidays,
            HashSet::from([date(2018, 3, 30), date(2018, 4, 2)])
        );
    }

    #[tokio::test]
    async fn test_gov_uk_holidays_unknown_region() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/bank-holidays.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(BANK_HOLIDAYS.as_str())
            .create_async()
            .await;

        let mut source =
            GovUkBankHolidays::with_api_url(&format!("{}/bank-holidays.json", server.url()));
        let result = source.holidays("wales-and-england").await;

        assert!(matches!(result, Err(BalanceError::HolidaySource(_))));
    }

    #[tokio::test]
    async fn test_gov_uk_holidays_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/bank-holidays.json")
            .with_status(503)
            .create_async()
            .await;

        let mut source =
            GovUkBankHolidays::with_api_url(&format!("{}/bank-holidays.json", server.url()));
        let result = source.holidays("england-and-wales").await;

        assert!(matches!(result, Err(BalanceError::HolidaySource(_))));
    }

    #[tokio::test]
    async fn test_gov_uk_holidays_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/bank-holidays.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"england-and-wales": {"events": [{"date": "30/03/2018"}]}}"#)
            .create_async()
            .await;

        let mut source =
            GovUkBankHolidays::with_api_url(&format!("{}/bank-holidays.json", server.url()));
        let result = source.holidays("england-and-wales").await;

        assert!(matches!(result, Err(BalanceError::HolidaySource(_))));
    }

    /// 同じ地域は1度しか取得しない。
    #[tokio::test]
    async fn test_cached_holiday_source() {
        let mut inner = MockPublicHolidaySource::new();
        inner
            .expect_holidays()
            .withf(|region| region == "england-and-wales")
            .times(1)
            .returning(|_| Ok(HashSet::from([date(2018, 3, 30)])));
        inner
            .expect_holidays()
            .withf(|region| region == "scotland")
            .times(1)
            .returning(|_| Ok(HashSet::from([date(2018, 1, 2)])));

        let mut source = CachedHolidaySource::new(inner);

        for _ in 0..2 {
            assert_eq!(
                source.holidays("england-and-wales").await.unwrap(),
                HashSet::from([date(2018, 3, 30)])
            );
        }
        assert_eq!(
            source.holidays("scotland").await.unwrap(),
            HashSet::from([date(2018, 1, 2)])
        );
    }
}
