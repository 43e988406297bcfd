//! Single-selection expansion state / 单选展开状态

use serde::Serialize;

/// Result of a toggle, returned so callers can re-derive views / 展开状态变化
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "transition", rename_all = "snake_case")]
pub enum Transition {
    Expanded { id: String },
    Collapsed { id: String },
    Switched { from: String, to: String },
}

/// At most one location is expanded at a time / 同一时刻最多展开一个地点
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    expanded: Option<String>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expanded(&self) -> Option<&str> {
        self.expanded.as_deref()
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.as_deref() == Some(id)
    }

    /// Expand `id`, or collapse it if it is already expanded / 切换展开
    pub fn toggle(&mut self, id: &str) -> Transition {
        match self.expanded.take() {
            Some(current) if current == id => Transition::Collapsed { id: current },
            Some(current) => {
                self.expanded = Some(id.to_string());
                Transition::Switched {
                    from: current,
                    to: id.to_string(),
                }
            }
            None => {
                self.expanded = Some(id.to_string());
                Transition::Expanded { id: id.to_string() }
            }
        }
    }

    pub fn collapse(&mut self) -> Option<String> {
        self.expanded.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_twice_collapses() {
        let mut state = ExpansionState::new();
        assert_eq!(state.toggle("a"), Transition::Expanded { id: "a".to_string() });
        assert!(state.is_expanded("a"));
        assert_eq!(state.toggle("a"), Transition::Collapsed { id: "a".to_string() });
        assert_eq!(state.expanded(), None);
    }

    #[test]
    fn test_expanding_second_collapses_first() {
        let mut state = ExpansionState::new();
        state.toggle("a");
        assert_eq!(
            state.toggle("b"),
            Transition::Switched { from: "a".to_string(), to: "b".to_string() }
        );
        assert!(!state.is_expanded("a"));
        assert!(state.is_expanded("b"));
    }

    #[test]
    fn test_collapse() {
        let mut state = ExpansionState::new();
        assert_eq!(state.collapse(), None);
        state.toggle("a");
        assert_eq!(state.collapse(), Some("a".to_string()));
        assert_eq!(state.expanded(), None);
    }
}
