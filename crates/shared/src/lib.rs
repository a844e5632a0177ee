use std::fmt;

use serde::{Deserialize, Serialize};

/// Значение одной колонки строки дерева деталей
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnValue {
    Bool(bool),
    Number(f64),
    Text(String),
    /// Пустое значение (также результат обращения вне диапазона)
    #[default]
    Empty,
}

impl ColumnValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, ColumnValue::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ColumnValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Булево значение; строки "true"/"false" тоже принимаются
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ColumnValue::Bool(b) => Some(*b),
            ColumnValue::Text(s) => match s.trim() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ColumnValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for ColumnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnValue::Bool(b) => write!(f, "{b}"),
            ColumnValue::Number(n) => write!(f, "{n}"),
            ColumnValue::Text(s) => f.write_str(s),
            ColumnValue::Empty => Ok(()),
        }
    }
}

impl From<&str> for ColumnValue {
    fn from(value: &str) -> Self {
        ColumnValue::Text(value.to_string())
    }
}

impl From<String> for ColumnValue {
    fn from(value: String) -> Self {
        ColumnValue::Text(value)
    }
}

impl From<bool> for ColumnValue {
    fn from(value: bool) -> Self {
        ColumnValue::Bool(value)
    }
}

impl From<f64> for ColumnValue {
    fn from(value: f64) -> Self {
        ColumnValue::Number(value)
    }
}

/// Цвет детали, 8 бит на канал
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Каналы в диапазоне 0.0..=1.0
    pub fn to_unit(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for Rgb {
    /// Серый по умолчанию
    fn default() -> Self {
        Self::new(100, 100, 100)
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(c: [u8; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }
}

/// Фильтры отображения детали
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DisplayFilters {
    /// Отсечение плоскостью
    pub clip: bool,
    /// Сжатие треугольников к центроиду
    pub shrink: bool,
}

/// Ось вращения сцены
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Вид команды для потока рендеринга
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    EndRender,
    RotateX,
    RotateY,
    RotateZ,
}

/// Команда потоку рендеринга
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenderCommand {
    /// Повернуть сцену вокруг оси (градусы)
    Rotate { axis: Axis, degrees: f64 },
    /// Завершить цикл рендеринга
    EndRender,
}

impl RenderCommand {
    /// Собрать команду из вида и значения; для EndRender значение игнорируется
    pub fn from_kind(kind: CommandKind, value: f64) -> Self {
        match kind {
            CommandKind::EndRender => RenderCommand::EndRender,
            CommandKind::RotateX => RenderCommand::Rotate { axis: Axis::X, degrees: value },
            CommandKind::RotateY => RenderCommand::Rotate { axis: Axis::Y, degrees: value },
            CommandKind::RotateZ => RenderCommand::Rotate { axis: Axis::Z, degrees: value },
        }
    }
}

/// Снимок редактируемых свойств детали (для формы свойств)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartProperties {
    pub name: String,
    pub visible: bool,
    #[serde(default)]
    pub color: Rgb,
    #[serde(default)]
    pub clip: bool,
    #[serde(default)]
    pub shrink: bool,
}

impl Default for PartProperties {
    fn default() -> Self {
        Self {
            name: String::new(),
            visible: true,
            color: Rgb::default(),
            clip: false,
            shrink: false,
        }
    }
}

impl PartProperties {
    pub fn filters(&self) -> DisplayFilters {
        DisplayFilters {
            clip: self.clip,
            shrink: self.shrink,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_value_json_is_untagged() {
        let row: Vec<ColumnValue> = serde_json::from_str(r#"["Part", true, null, 2.5]"#).unwrap();
        assert_eq!(
            row,
            vec![
                ColumnValue::from("Part"),
                ColumnValue::Bool(true),
                ColumnValue::Empty,
                ColumnValue::Number(2.5),
            ]
        );
    }

    #[test]
    fn column_value_bool_from_text() {
        assert_eq!(ColumnValue::from("true").as_bool(), Some(true));
        assert_eq!(ColumnValue::from("nope").as_bool(), None);
        assert_eq!(ColumnValue::Empty.to_string(), "");
    }

    #[test]
    fn default_color_is_mid_gray() {
        assert_eq!(Rgb::default(), Rgb::new(100, 100, 100));
        let unit = Rgb::new(255, 0, 0).to_unit();
        assert_eq!(unit, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn render_command_from_kind() {
        assert_eq!(
            RenderCommand::from_kind(CommandKind::RotateY, 5.0),
            RenderCommand::Rotate { axis: Axis::Y, degrees: 5.0 }
        );
        assert_eq!(RenderCommand::from_kind(CommandKind::EndRender, 1.0), RenderCommand::EndRender);
    }

    #[test]
    fn render_command_serde() {
        let cmd: RenderCommand =
            serde_json::from_str(r#"{"type": "rotate", "axis": "x", "degrees": 15.0}"#).unwrap();
        assert_eq!(cmd, RenderCommand::Rotate { axis: Axis::X, degrees: 15.0 });
    }
}
