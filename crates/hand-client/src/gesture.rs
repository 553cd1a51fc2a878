//! 手势库
//!
//! 有序的命名位置快照列表，最多 10 条。纯数据与校验，不涉及设备 I/O。
//!
//! 持久化格式为 CSV，表头为 `name,position1,position2,position3,position4,position5`。

use hand_protocol::{ACTUATOR_COUNT, HandPositions, Position};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

/// 手势库容量
pub const MAX_GESTURES: usize = 10;

/// CSV 表头
pub const CSV_HEADER: [&str; ACTUATOR_COUNT + 1] = [
    "name",
    "position1",
    "position2",
    "position3",
    "position4",
    "position5",
];

/// 启动时默认加载的手势文件
pub const DEFAULT_GESTURE_FILE: &str = "gestures.csv";

/// 手势库错误
#[derive(Error, Debug)]
pub enum GestureError {
    #[error("Gesture name must not be empty")]
    EmptyName,

    #[error("Gesture name contains control characters: {0:?}")]
    InvalidName(String),

    #[error("Gesture store is full ({count} gestures)")]
    CapacityExceeded { count: usize },

    #[error("Gesture index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid gesture row at line {line}: {reason}")]
    InvalidRow { line: u64, reason: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// 命名的整手位置快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gesture {
    name: String,
    positions: HandPositions,
}

impl Gesture {
    /// 创建手势（名称去除首尾空白后不能为空，也不能含控制字符）
    pub fn new(name: impl Into<String>, positions: HandPositions) -> Result<Self, GestureError> {
        Ok(Self {
            name: validate_name(name.into())?,
            positions,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn positions(&self) -> &HandPositions {
        &self.positions
    }
}

fn validate_name(name: String) -> Result<String, GestureError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(GestureError::EmptyName)
    } else if trimmed.chars().any(char::is_control) {
        Err(GestureError::InvalidName(trimmed.to_string()))
    } else if trimmed.len() == name.len() {
        Ok(name)
    } else {
        Ok(trimmed.to_string())
    }
}

/// CSV 中的一行
#[derive(Debug, Serialize)]
struct GestureRow<'a> {
    name: &'a str,
    position1: u16,
    position2: u16,
    position3: u16,
    position4: u16,
    position5: u16,
}

impl<'a> From<&'a Gesture> for GestureRow<'a> {
    fn from(g: &'a Gesture) -> Self {
        let [p1, p2, p3, p4, p5] = g.positions.map(Position::ticks);
        Self {
            name: &g.name,
            position1: p1,
            position2: p2,
            position3: p3,
            position4: p4,
            position5: p5,
        }
    }
}

/// 反序列化结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedGestures {
    /// 按文件顺序保留的手势（最多 10 条）
    pub gestures: Vec<Gesture>,
    /// 文件中的手势超过 10 条，多余部分被丢弃
    pub truncated: bool,
    /// 因字段不足被跳过的行数
    pub skipped: usize,
}

/// 手势库
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GestureStore {
    gestures: Vec<Gesture>,
}

impl GestureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.gestures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gestures.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.gestures.len() >= MAX_GESTURES
    }

    pub fn get(&self, index: usize) -> Option<&Gesture> {
        self.gestures.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Gesture> {
        self.gestures.iter()
    }

    /// 按名称查找（返回第一个匹配项的索引）
    pub fn find(&self, name: &str) -> Option<usize> {
        self.gestures.iter().position(|g| g.name == name)
    }

    fn check_index(&self, index: usize) -> Result<(), GestureError> {
        if index < self.gestures.len() {
            Ok(())
        } else {
            Err(GestureError::IndexOutOfRange {
                index,
                len: self.gestures.len(),
            })
        }
    }

    /// 以当前位置表快照创建新手势
    ///
    /// # 错误
    ///
    /// 已有 10 条时返回 `CapacityExceeded`，手势库保持不变。
    pub fn capture(
        &mut self,
        name: impl Into<String>,
        snapshot: HandPositions,
    ) -> Result<&Gesture, GestureError> {
        if self.is_full() {
            return Err(GestureError::CapacityExceeded {
                count: self.gestures.len(),
            });
        }
        let gesture = Gesture::new(name, snapshot)?;
        debug!("Captured gesture '{}'", gesture.name);
        self.gestures.push(gesture);
        Ok(&self.gestures[self.gestures.len() - 1])
    }

    /// 覆盖手势的位置
    pub fn update(&mut self, index: usize, positions: HandPositions) -> Result<(), GestureError> {
        self.check_index(index)?;
        self.gestures[index].positions = positions;
        Ok(())
    }

    /// 重命名手势
    pub fn rename(&mut self, index: usize, name: impl Into<String>) -> Result<(), GestureError> {
        self.check_index(index)?;
        self.gestures[index].name = validate_name(name.into())?;
        Ok(())
    }

    /// 删除手势
    pub fn remove(&mut self, index: usize) -> Result<Gesture, GestureError> {
        self.check_index(index)?;
        Ok(self.gestures.remove(index))
    }

    /// 用加载结果替换全部手势（超出容量的部分被丢弃）
    pub fn replace_all(&mut self, mut gestures: Vec<Gesture>) -> bool {
        let truncated = gestures.len() > MAX_GESTURES;
        gestures.truncate(MAX_GESTURES);
        self.gestures = gestures;
        truncated
    }

    /// 写出 CSV（总是包含表头）
    pub fn serialize<W: Write>(&self, writer: W) -> Result<(), GestureError> {
        let mut csv = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        csv.write_record(CSV_HEADER)?;
        for gesture in &self.gestures {
            csv.serialize(GestureRow::from(gesture))?;
        }
        csv.flush()?;
        Ok(())
    }

    /// 读取 CSV
    ///
    /// - 第一行视为表头
    /// - 字段少于 6 个的行被跳过
    /// - 位置不是整数时返回 `InvalidRow`，超出行程范围的位置被截断
    /// - 超过 10 条时保留前 10 条并设置 `truncated`
    pub fn deserialize<R: Read>(reader: R) -> Result<LoadedGestures, GestureError> {
        let mut csv = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut loaded = LoadedGestures::default();
        for record in csv.records() {
            let record = record?;
            if record.len() < ACTUATOR_COUNT + 1 {
                loaded.skipped += 1;
                continue;
            }
            if loaded.gestures.len() == MAX_GESTURES {
                loaded.truncated = true;
                break;
            }

            let line = record.position().map_or(0, |p| p.line());
            let mut ticks = [0i32; ACTUATOR_COUNT];
            for (i, slot) in ticks.iter_mut().enumerate() {
                let field = &record[i + 1];
                *slot = field.parse().map_err(|_| GestureError::InvalidRow {
                    line,
                    reason: format!("position{} is not an integer: '{}'", i + 1, field),
                })?;
            }

            let gesture = Gesture::new(&record[0], ticks.map(Position::clamped)).map_err(|e| {
                GestureError::InvalidRow {
                    line,
                    reason: e.to_string(),
                }
            })?;
            loaded.gestures.push(gesture);
        }

        if loaded.truncated {
            warn!("Gesture list truncated to the first {} entries", MAX_GESTURES);
        }
        Ok(loaded)
    }

    /// 保存到文件
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), GestureError> {
        let path = path.as_ref();
        self.serialize(File::create(path)?)?;
        info!("Saved {} gestures to {}", self.len(), path.display());
        Ok(())
    }

    /// 从文件读取
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<LoadedGestures, GestureError> {
        let path = path.as_ref();
        let loaded = Self::deserialize(File::open(path)?)?;
        info!(
            "Loaded {} gestures from {}",
            loaded.gestures.len(),
            path.display()
        );
        Ok(loaded)
    }

    /// 文件存在时加载，不存在时返回空手势库
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, GestureError> {
        let path = path.as_ref();
        let mut store = Self::new();
        if path.exists() {
            store.replace_all(Self::load_from_file(path)?.gestures);
        }
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hand_protocol::clamp_positions;

    fn positions(base: i32) -> HandPositions {
        clamp_positions([base, base + 1, base + 2, base + 3, base + 4])
    }

    #[test]
    fn test_capture_and_capacity() {
        let mut store = GestureStore::new();
        for i in 0..MAX_GESTURES {
            store.capture(format!("g{}", i), positions(100)).unwrap();
        }
        assert!(store.is_full());

        let err = store.capture("eleventh", positions(100)).unwrap_err();
        assert!(matches!(err, GestureError::CapacityExceeded { count: 10 }));
        assert_eq!(store.len(), MAX_GESTURES);
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut store = GestureStore::new();
        assert!(matches!(
            store.capture("   ", positions(100)),
            Err(GestureError::EmptyName)
        ));
        assert!(store.is_empty());

        let g = store.capture("  fist ", positions(100)).unwrap();
        assert_eq!(g.name(), "fist");
    }

    #[test]
    fn test_control_characters_rejected() {
        let mut store = GestureStore::new();
        assert!(matches!(
            store.capture("fi\0st", positions(100)),
            Err(GestureError::InvalidName(_))
        ));
        store.capture("fist", positions(100)).unwrap();
        assert!(store.rename(0, "tab\there").is_err());
        assert_eq!(store.get(0).unwrap().name(), "fist");

        let csv = "name,position1,position2,position3,position4,position5\n\
                   fi\0st,25,25,25,25,25\n";
        let err = GestureStore::deserialize(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, GestureError::InvalidRow { line: 2, .. }));
    }

    #[test]
    fn test_edit_rename_remove() {
        let mut store = GestureStore::new();
        store.capture("a", positions(100)).unwrap();
        store.capture("b", positions(200)).unwrap();

        store.update(0, positions(300)).unwrap();
        assert_eq!(store.get(0).unwrap().positions(), &positions(300));

        store.rename(1, "peace").unwrap();
        assert_eq!(store.find("peace"), Some(1));

        let removed = store.remove(0).unwrap();
        assert_eq!(removed.name(), "a");
        assert_eq!(store.len(), 1);

        assert!(matches!(
            store.update(5, positions(100)),
            Err(GestureError::IndexOutOfRange { index: 5, len: 1 })
        ));
        assert!(matches!(
            store.rename(1, "x"),
            Err(GestureError::IndexOutOfRange { index: 1, len: 1 })
        ));
        assert!(store.remove(1).is_err());
    }

    #[test]
    fn test_csv_roundtrip() {
        let mut store = GestureStore::new();
        store.capture("fist", clamp_positions([1775, 1775, 1775, 1775, 1475])).unwrap();
        store.capture("open, flat", positions(25)).unwrap();

        let mut buf = Vec::new();
        store.serialize(&mut buf).unwrap();
        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.starts_with("name,position1,position2,position3,position4,position5\n"));
        assert!(text.contains("fist,1775,1775,1775,1775,1475"));

        let loaded = GestureStore::deserialize(buf.as_slice()).unwrap();
        assert!(!loaded.truncated);
        assert_eq!(loaded.gestures, store.iter().cloned().collect::<Vec<_>>());
    }

    #[test]
    fn test_empty_store_writes_header() {
        let mut buf = Vec::new();
        GestureStore::new().serialize(&mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "name,position1,position2,position3,position4,position5\n"
        );
    }

    #[test]
    fn test_deserialize_skips_short_rows_and_clamps() {
        let csv = "name,position1,position2,position3,position4,position5\n\
                   short,1,2\n\
                   wide,0,100,2000,500,25\n";
        let loaded = GestureStore::deserialize(csv.as_bytes()).unwrap();

        assert_eq!(loaded.skipped, 1);
        assert_eq!(loaded.gestures.len(), 1);
        let ticks = loaded.gestures[0].positions().map(Position::ticks);
        assert_eq!(ticks, [25, 100, 1775, 500, 25]);
    }

    #[test]
    fn test_deserialize_invalid_integer() {
        let csv = "name,position1,position2,position3,position4,position5\n\
                   bad,1,2,x,4,5\n";
        let err = GestureStore::deserialize(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, GestureError::InvalidRow { line: 2, .. }));
    }

    #[test]
    fn test_deserialize_truncates_to_ten() {
        let mut csv = String::from("name,position1,position2,position3,position4,position5\n");
        for i in 0..15 {
            csv.push_str(&format!("g{},25,25,25,25,25\n", i));
        }

        let loaded = GestureStore::deserialize(csv.as_bytes()).unwrap();
        assert!(loaded.truncated);
        let names: Vec<&str> = loaded.gestures.iter().map(|g| g.name()).collect();
        assert_eq!(names, (0..10).map(|i| format!("g{}", i)).collect::<Vec<_>>());
    }

    #[test]
    fn test_replace_all_truncates() {
        let gestures: Vec<Gesture> = (0..12)
            .map(|i| Gesture::new(format!("g{}", i), positions(100)).unwrap())
            .collect();
        let mut store = GestureStore::new();
        assert!(store.replace_all(gestures));
        assert_eq!(store.len(), MAX_GESTURES);
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gestures.csv");

        let mut store = GestureStore::new();
        store.capture("point", clamp_positions([1775, 25, 25, 25, 25])).unwrap();
        store.save_to_file(&path).unwrap();

        let loaded = GestureStore::load_or_default(&path).unwrap();
        assert_eq!(loaded, store);

        let missing = GestureStore::load_or_default(dir.path().join("missing.csv")).unwrap();
        assert!(missing.is_empty());
    }
}
