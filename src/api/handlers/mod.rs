pub mod bookmarks;
pub mod books;
pub mod orders;
pub mod requests;

use crate::application::{ApplicationError, ServiceDependencies};
use std::str::FromStr;

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

/// ボディ中の列挙値（ジャンル、ステータスなど）を解析する
///
/// 不正な値は`{VALUE} is not a valid ...`のメッセージで400になる。
fn parse_field<T>(value: &str) -> Result<T, ApplicationError>
where
    T: FromStr<Err = String>,
{
    value.parse::<T>().map_err(ApplicationError::Validation)
}

/// 省略可能な列挙値を解析する
fn parse_optional<T>(value: Option<String>) -> Result<Option<T>, ApplicationError>
where
    T: FromStr<Err = String>,
{
    value.as_deref().map(parse_field).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Genre, ShippingMethod};

    #[test]
    fn test_parse_field_reports_invalid_value() {
        let err = parse_field::<Genre>("poetry").unwrap_err();
        assert_eq!(err.to_string(), "poetry is not a valid genre");
    }

    #[test]
    fn test_parse_optional_passes_through_none() {
        let parsed: Option<ShippingMethod> = parse_optional(None).unwrap();
        assert_eq!(parsed, None);
    }
}
