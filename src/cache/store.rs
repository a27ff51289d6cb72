use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// 进程内键值存储
///
/// 限流计数器与查询缓存都只依赖这个接口，构造时注入，互不共享实例。
pub trait Store<V>: Send + Sync {
    fn get(&self, key: &str) -> Option<V>;

    fn set(&self, key: &str, value: V);

    /// 删除键，返回是否存在过
    fn delete(&self, key: &str) -> bool;

    /// 在同一临界区内读取旧值并写入新值，返回写入后的值
    fn update(&self, key: &str, f: &mut dyn FnMut(Option<&V>) -> V) -> V;

    /// 只保留 `keep` 返回 true 的条目，返回删除数量
    fn sweep(&self, keep: &dyn Fn(&V) -> bool) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 基于 `HashMap` 的内存存储，重启即丢失
#[derive(Debug)]
pub struct InMemoryStore<V> {
    entries: Mutex<HashMap<String, V>>,
}

impl<V> Default for InMemoryStore<V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<V> InMemoryStore<V> {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, V>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<V: Clone + Send> Store<V> for InMemoryStore<V> {
    fn get(&self, key: &str) -> Option<V> {
        self.entries().get(key).cloned()
    }

    fn set(&self, key: &str, value: V) {
        self.entries().insert(key.to_string(), value);
    }

    fn delete(&self, key: &str) -> bool {
        self.entries().remove(key).is_some()
    }

    fn update(&self, key: &str, f: &mut dyn FnMut(Option<&V>) -> V) -> V {
        let mut entries = self.entries();
        let next = f(entries.get(key));
        entries.insert(key.to_string(), next.clone());
        next
    }

    fn sweep(&self, keep: &dyn Fn(&V) -> bool) -> usize {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, value| keep(value));
        before - entries.len()
    }

    fn len(&self) -> usize {
        self.entries().len()
    }
}
