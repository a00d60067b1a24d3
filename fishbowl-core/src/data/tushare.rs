//! Tushare Pro data provider.
//!
//! Tushare exposes every dataset through a single JSON endpoint: a POST with
//! `{api_name, token, params, fields}` answered by `{code, msg, data:
//! {fields, items}}`. The route key selects `api_name`, so one provider
//! serves A-share indices (`index_daily`), ETFs (`fund_daily`), global
//! indices (`index_global`), and precious-metal spot (`sge_daily`).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use super::provider::{DataProvider, ProviderError, RawSeries};

const API_URL: &str = "http://api.tushare.pro";

/// ETF endpoints need forward-adjusted prices to remove dividend gaps.
const ADJUSTED_ROUTES: [&str; 1] = ["fund_daily"];

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    api_name: &'a str,
    token: &'a str,
    params: RequestParams<'a>,
    fields: &'a str,
}

#[derive(Debug, Serialize)]
struct RequestParams<'a> {
    ts_code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    adj: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    code: i64,
    msg: Option<String>,
    data: Option<ApiData>,
}

#[derive(Debug, Deserialize)]
struct ApiData {
    fields: Vec<String>,
    items: Vec<Vec<Value>>,
}

/// Tushare Pro provider over blocking HTTP.
pub struct TushareProvider {
    client: reqwest::blocking::Client,
    token: String,
}

impl TushareProvider {
    pub fn new(token: impl Into<String>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            token: token.into(),
        }
    }

    fn parse_response(symbol: &str, resp: ApiResponse) -> Result<RawSeries, ProviderError> {
        if resp.code != 0 {
            return Err(ProviderError::Rejected {
                symbol: symbol.to_string(),
                message: resp.msg.unwrap_or_else(|| format!("code {}", resp.code)),
            });
        }

        let data = resp
            .data
            .ok_or_else(|| ProviderError::ResponseFormatChanged("code 0 with no data".into()))?;

        Ok(RawSeries {
            symbol: symbol.to_string(),
            columns: data.fields,
            rows: data.items,
        })
    }
}

impl DataProvider for TushareProvider {
    fn name(&self) -> &str {
        "tushare_pro"
    }

    fn fetch(&self, symbol: &str, route: &str) -> Result<RawSeries, ProviderError> {
        let request = ApiRequest {
            api_name: route,
            token: &self.token,
            params: RequestParams {
                ts_code: symbol,
                adj: ADJUSTED_ROUTES.contains(&route).then_some("qfq"),
            },
            fields: "trade_date,close",
        };

        let resp = self
            .client
            .post(API_URL)
            .json(&request)
            .send()
            .map_err(|e| ProviderError::NetworkUnreachable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ProviderError::HttpStatus {
                symbol: symbol.to_string(),
                status: status.as_u16(),
            });
        }

        let body: ApiResponse = resp.json().map_err(|e| {
            ProviderError::ResponseFormatChanged(format!("failed to parse response for {symbol}: {e}"))
        })?;

        Self::parse_response(symbol, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ok_response_maps_to_raw_series() {
        let resp = ApiResponse {
            code: 0,
            msg: None,
            data: Some(ApiData {
                fields: vec!["trade_date".into(), "close".into()],
                items: vec![vec![json!("20240308"), json!(3587.21)]],
            }),
        };
        let series = TushareProvider::parse_response("000300.SH", resp).unwrap();
        assert_eq!(series.columns, vec!["trade_date", "close"]);
        assert_eq!(series.rows.len(), 1);
    }

    #[test]
    fn nonzero_code_is_rejected() {
        let resp = ApiResponse {
            code: 40203,
            msg: Some("permission denied".into()),
            data: None,
        };
        let err = TushareProvider::parse_response("000300.SH", resp).unwrap_err();
        assert!(matches!(err, ProviderError::Rejected { .. }));
    }

    #[test]
    fn ok_without_data_is_format_change() {
        let resp = ApiResponse {
            code: 0,
            msg: None,
            data: None,
        };
        let err = TushareProvider::parse_response("000300.SH", resp).unwrap_err();
        assert!(matches!(err, ProviderError::ResponseFormatChanged(_)));
    }

    #[test]
    fn fund_daily_requests_forward_adjustment() {
        let req = ApiRequest {
            api_name: "fund_daily",
            token: "t",
            params: RequestParams {
                ts_code: "512480.SH",
                adj: ADJUSTED_ROUTES.contains(&"fund_daily").then_some("qfq"),
            },
            fields: "trade_date,close",
        };
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["params"]["adj"], "qfq");

        let req = ApiRequest {
            api_name: "index_daily",
            token: "t",
            params: RequestParams {
                ts_code: "000300.SH",
                adj: ADJUSTED_ROUTES.contains(&"index_daily").then_some("qfq"),
            },
            fields: "trade_date,close",
        };
        let body = serde_json::to_value(&req).unwrap();
        assert!(body["params"].get("adj").is_none());
    }
}
