use crate::common::error::WcError;

/// wctree全体で使用するResult型のエイリアス
///
/// # Examples
///
/// ```
/// use wctree::common::result::WcResult;
/// use wctree::common::error::WcError;
///
/// fn example_function() -> WcResult<String> {
///     Ok("success".to_string())
/// }
///
/// fn example_with_error() -> WcResult<()> {
///     Err(WcError::internal_error("Something went wrong"))
/// }
/// ```
pub type WcResult<T> = Result<T, WcError>;

/// Optionのエラー変換ヘルパー
pub trait OptionExt<T> {
    /// OptionをWcResultに変換する
    ///
    /// ```
    /// use wctree::common::result::{WcResult, OptionExt};
    ///
    /// let none_value: Option<String> = None;
    /// let result: WcResult<String> = none_value.ok_or_internal_error("Value not found");
    /// assert!(result.is_err());
    /// ```
    fn ok_or_internal_error(self, message: impl Into<String>) -> WcResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_internal_error(self, message: impl Into<String>) -> WcResult<T> {
        self.ok_or_else(|| WcError::internal_error(message))
    }
}

/// Resultのエラー変換ヘルパー
pub trait ResultExt<T, E> {
    /// ファイルシステムエラーとしてWcResultに変換
    fn with_filesystem_error(
        self,
        message: impl Into<String>,
        path: Option<std::path::PathBuf>,
    ) -> WcResult<T>
    where
        E: Into<std::io::Error>;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    fn with_filesystem_error(
        self,
        message: impl Into<String>,
        path: Option<std::path::PathBuf>,
    ) -> WcResult<T>
    where
        E: Into<std::io::Error>,
    {
        self.map_err(|e| WcError::filesystem_error_with_source(message, path, e.into()))
    }
}

/// チェーンオペレーション用のヘルパー
pub trait WcResultExt<T> {
    /// Optionに変換（エラーをログ出力）
    fn to_option_logged(self) -> Option<T>;
}

impl<T> WcResultExt<T> for WcResult<T> {
    fn to_option_logged(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("{}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_option_ext_ok_or_internal_error() {
        let none_value: Option<String> = None;
        let result = none_value.ok_or_internal_error("test error");

        if let Err(WcError::InternalError { message, .. }) = result {
            assert_eq!(message, "test error");
        } else {
            panic!("Expected InternalError");
        }

        assert_eq!(Some(3).ok_or_internal_error("unused").unwrap(), 3);
    }

    #[test]
    fn test_result_ext_with_filesystem_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let result: Result<String, std::io::Error> = Err(io_error);
        let path = Some(PathBuf::from("/test/path"));

        let wc_result = result.with_filesystem_error("test operation", path.clone());
        if let Err(WcError::FileSystemError { path: p, .. }) = wc_result {
            assert_eq!(p, path);
        } else {
            panic!("Expected FileSystemError");
        }
    }

    #[test]
    fn test_to_option_logged() {
        let ok_result: WcResult<String> = Ok("test".to_string());
        assert_eq!(ok_result.to_option_logged(), Some("test".to_string()));

        let err_result: WcResult<String> = Err(WcError::internal_error("error"));
        assert_eq!(err_result.to_option_logged(), None);
    }
}
