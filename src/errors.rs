//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_coursedesk_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum CourseDeskError {
            $($variant(String),)*
        }

        impl CourseDeskError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(CourseDeskError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(CourseDeskError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(CourseDeskError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl CourseDeskError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        CourseDeskError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_coursedesk_errors! {
    DatabaseConfig("E001", "Database Configuration Error"),
    DatabaseConnection("E002", "Database Connection Error"),
    DatabaseOperation("E003", "Database Operation Error"),
    Validation("E004", "Validation Error"),
    NotFound("E005", "Resource Not Found"),
    Conflict("E006", "Conflict Error"),
    Template("E007", "Template Error"),
    Authorization("E008", "Authorization Error"),
}

impl CourseDeskError {
    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for CourseDeskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CourseDeskError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for CourseDeskError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(detail)) => {
                CourseDeskError::Conflict(detail)
            }
            _ => CourseDeskError::DatabaseOperation(err.to_string()),
        }
    }
}

impl From<handlebars::RenderError> for CourseDeskError {
    fn from(err: handlebars::RenderError) -> Self {
        CourseDeskError::Template(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CourseDeskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(CourseDeskError::database_config("test").code(), "E001");
        assert_eq!(CourseDeskError::validation("test").code(), "E004");
        assert_eq!(CourseDeskError::conflict("test").code(), "E006");
        assert_eq!(CourseDeskError::authorization("test").code(), "E008");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            CourseDeskError::not_found("test").error_type(),
            "Resource Not Found"
        );
        assert_eq!(
            CourseDeskError::validation("test").error_type(),
            "Validation Error"
        );
    }

    #[test]
    fn test_error_message() {
        let err = CourseDeskError::validation("Grade must be between 0 and 100");
        assert_eq!(err.message(), "Grade must be between 0 and 100");
    }

    #[test]
    fn test_format_simple() {
        let err = CourseDeskError::authorization("not the teacher of this course");
        let formatted = err.format_simple();
        assert!(formatted.contains("Authorization Error"));
        assert!(formatted.contains("not the teacher of this course"));
    }

    #[test]
    fn test_plain_db_error_maps_to_database_operation() {
        let err = CourseDeskError::from(sea_orm::DbErr::Custom("boom".into()));
        assert!(matches!(err, CourseDeskError::DatabaseOperation(_)));
    }
}
