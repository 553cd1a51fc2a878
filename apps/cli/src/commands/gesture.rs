//! 手势管理命令

use crate::session::Session;
use crate::utils::{cancel_on_ctrlc, ticks};
use anyhow::{Context, Result, bail};
use clap::Subcommand;
use hand_sdk::client::GestureStore;
use hand_sdk::prelude::MotionOutcome;

/// 手势命令
#[derive(Subcommand, Debug)]
pub enum GestureCommand {
    /// 列出手势
    List,

    /// 回放手势（名称或序号）
    Play { gesture: String },

    /// 以设备当前姿态保存新手势
    Capture { name: String },

    /// 重命名手势
    Rename { gesture: String, name: String },

    /// 删除手势
    Delete { gesture: String },
}

/// 按序号或名称查找手势
pub fn resolve(store: &GestureStore, key: &str) -> Result<usize> {
    if let Ok(index) = key.parse::<usize>() {
        if index < store.len() {
            return Ok(index);
        }
        bail!("Gesture index {} out of range ({} gestures)", index, store.len());
    }
    store
        .find(key)
        .with_context(|| format!("No gesture named '{}'", key))
}

impl GestureCommand {
    pub fn execute(self, session: &Session) -> Result<()> {
        let path = session.gestures_path().to_path_buf();
        let mut store = GestureStore::load_or_default(&path)
            .with_context(|| format!("Failed to load gestures from {}", path.display()))?;

        match self {
            GestureCommand::List => {
                if store.is_empty() {
                    println!("No gestures in {}", path.display());
                }
                for (i, gesture) in store.iter().enumerate() {
                    println!("{:>2}  {:<16} {:?}", i, gesture.name(), ticks(gesture.positions()));
                }
            },

            GestureCommand::Play { gesture } => {
                let index = resolve(&store, &gesture)?;
                let name = store.get(index).map(|g| g.name().to_string()).unwrap_or_default();
                let mut client = session.client(false, false)?;
                client.gestures_mut().replace_all(store.iter().cloned().collect());

                let cancel = cancel_on_ctrlc()?;
                match client.play_gesture_blocking(index, &cancel)? {
                    MotionOutcome::Cancelled => println!("Cancelled"),
                    _ => {
                        let table = client.actuators().snapshot()?;
                        println!("Played '{}', now at {:?}", name, ticks(&table));
                    },
                }
                client.shutdown();
            },

            GestureCommand::Capture { name } => {
                let mut client = session.client_at_measured()?;
                client.gestures_mut().replace_all(store.iter().cloned().collect());
                let positions = *client.capture_gesture(name.as_str())?.positions();
                client.save_gestures(&path)?;
                println!("Captured '{}' at {:?}", name.trim(), ticks(&positions));
                client.shutdown();
            },

            GestureCommand::Rename { gesture, name } => {
                let index = resolve(&store, &gesture)?;
                store.rename(index, name.as_str())?;
                store.save_to_file(&path)?;
                println!("Renamed gesture {} to '{}'", index, name.trim());
            },

            GestureCommand::Delete { gesture } => {
                let index = resolve(&store, &gesture)?;
                let removed = store.remove(index)?;
                store.save_to_file(&path)?;
                println!("Deleted '{}'", removed.name());
            },
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hand_sdk::protocol::clamp_positions;

    fn store() -> GestureStore {
        let mut store = GestureStore::new();
        store.capture("fist", clamp_positions([1775; 5])).unwrap();
        store.capture("open", clamp_positions([25; 5])).unwrap();
        store
    }

    #[test]
    fn test_resolve_by_index_and_name() {
        let store = store();
        assert_eq!(resolve(&store, "1").unwrap(), 1);
        assert_eq!(resolve(&store, "fist").unwrap(), 0);
        assert!(resolve(&store, "5").is_err());
        assert!(resolve(&store, "wave").is_err());
    }
}
