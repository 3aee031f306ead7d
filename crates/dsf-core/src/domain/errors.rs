use std::error::Error;
use std::fmt::{Display, Formatter};

pub type DsfResult<T> = Result<T, DsfError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DsfErrorCategory {
    Success,
    InputValidationError,
    IoSystemError,
    ComputationError,
    IndexOutOfBounds,
    CountMismatch,
    NotImplemented,
    InvalidConfiguration,
    InternalError,
}

impl DsfErrorCategory {
    pub const fn exit_placeholder(self) -> ExitPlaceholder {
        match self {
            Self::Success => ExitPlaceholder {
                exit_code: 0,
                rust_category: "Success",
                short_class: "SUCCESS",
            },
            Self::InputValidationError => ExitPlaceholder {
                exit_code: 2,
                rust_category: "InputValidationError",
                short_class: "INPUT_FATAL",
            },
            Self::IoSystemError => ExitPlaceholder {
                exit_code: 3,
                rust_category: "IoSystemError",
                short_class: "IO_FATAL",
            },
            Self::ComputationError => ExitPlaceholder {
                exit_code: 4,
                rust_category: "ComputationError",
                short_class: "RUN_FATAL",
            },
            Self::IndexOutOfBounds => ExitPlaceholder {
                exit_code: 5,
                rust_category: "IndexOutOfBounds",
                short_class: "INDEX_FATAL",
            },
            Self::CountMismatch => ExitPlaceholder {
                exit_code: 6,
                rust_category: "CountMismatch",
                short_class: "COUNT_FATAL",
            },
            Self::NotImplemented => ExitPlaceholder {
                exit_code: 7,
                rust_category: "NotImplemented",
                short_class: "NOT_IMPLEMENTED",
            },
            Self::InvalidConfiguration => ExitPlaceholder {
                exit_code: 8,
                rust_category: "InvalidConfiguration",
                short_class: "CONFIG_FATAL",
            },
            Self::InternalError => ExitPlaceholder {
                exit_code: 9,
                rust_category: "InternalError",
                short_class: "SYS_FATAL",
            },
        }
    }

    pub const fn exit_code(self) -> i32 {
        self.exit_placeholder().exit_code
    }

    pub const fn rust_category(self) -> &'static str {
        self.exit_placeholder().rust_category
    }

    pub const fn short_class(self) -> &'static str {
        self.exit_placeholder().short_class
    }

    pub const fn is_fatal(self) -> bool {
        !matches!(self, Self::Success)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitPlaceholder {
    pub exit_code: i32,
    pub rust_category: &'static str,
    pub short_class: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DsfError {
    category: DsfErrorCategory,
    placeholder: &'static str,
    message: String,
}

impl DsfError {
    pub fn new(
        category: DsfErrorCategory,
        placeholder: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            placeholder,
            message: message.into(),
        }
    }

    pub fn input_validation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(DsfErrorCategory::InputValidationError, placeholder, message)
    }

    pub fn io_system(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(DsfErrorCategory::IoSystemError, placeholder, message)
    }

    pub fn computation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(DsfErrorCategory::ComputationError, placeholder, message)
    }

    pub fn index_out_of_bounds(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(DsfErrorCategory::IndexOutOfBounds, placeholder, message)
    }

    pub fn count_mismatch(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(DsfErrorCategory::CountMismatch, placeholder, message)
    }

    pub fn not_implemented(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(DsfErrorCategory::NotImplemented, placeholder, message)
    }

    pub fn invalid_configuration(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(DsfErrorCategory::InvalidConfiguration, placeholder, message)
    }

    pub fn internal(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(DsfErrorCategory::InternalError, placeholder, message)
    }

    pub const fn category(&self) -> DsfErrorCategory {
        self.category
    }

    pub const fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        let severity = if self.category.is_fatal() {
            "ERROR"
        } else {
            "INFO"
        };
        format!("{}: [{}] {}", severity, self.placeholder, self.message)
    }

    pub fn fatal_exit_line(&self) -> Option<String> {
        self.category
            .is_fatal()
            .then(|| format!("FATAL EXIT CODE: {}", self.exit_code()))
    }
}

impl Display for DsfError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category.rust_category(),
            self.placeholder,
            self.message
        )
    }
}

impl Error for DsfError {}
