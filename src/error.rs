// src/error.rs
//! Ошибки симулятора
//!
//! Шаг физики ошибок не возвращает: все граничные случаи (полюса, берега,
//! зацикливание по долготе) разбираются явными ветками. Ошибки возникают только
//! при настройке прогона (конфигурация, разрешение, маска суши), при экспорте
//! снимков и когда вызывающий код обнаружил нечисловые значения в сетке.

use std::path::PathBuf;
use thiserror::Error;

/// Результат операций симулятора
pub type SimResult<T> = Result<T, SimError>;

#[derive(Error, Debug)]
pub enum SimError {
    /// Шаг сетки не делит 180° нацело
    #[error("недопустимое разрешение сетки: {resolution}° (должно делить 180° нацело)")]
    InvalidResolution { resolution: f64 },

    /// Параметр конфигурации вне допустимого диапазона
    #[error("недопустимый параметр `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Неизвестное имя пресета суши
    #[error("неизвестный пресет суши: {0}")]
    UnknownPreset(String),

    /// Длина маски не совпадает с размером сетки
    #[error("размер маски {actual} не совпадает с сеткой {expected}")]
    MaskSize { expected: usize, actual: usize },

    /// Повреждённый растр береговой линии
    #[error("растр суши, строка {line}: {message}")]
    MaskAsset { line: usize, message: String },

    /// В сетке появились NaN/inf — расходимость при экстремальных параметрах
    #[error("нечисловое значение в поле `{field}` (строка {row}, столбец {col})")]
    NonFinite {
        field: &'static str,
        row: usize,
        col: usize,
    },

    /// Размер буфера пикселей не совпадает с размером снимка
    #[error("не удалось собрать изображение {width}×{height}")]
    ImageBuffer { width: u32, height: u32 },

    #[error("ошибка ввода-вывода: {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

impl SimError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SimError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        SimError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
