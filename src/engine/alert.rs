use super::store::Breakout;

/// The signal combination a fired alert matched, kept structured inside
/// the engine and only formatted to a display string at the sink boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub breakout: Option<Breakout>,
    pub swing: bool,
    pub momentum: bool,
}

impl Rule {
    pub fn is_active(&self) -> bool {
        self.breakout.is_some() || self.swing || self.momentum
    }

    /// Display form, components in fixed breakout → swing → momentum order,
    /// e.g. `breakout_HOD+swing+momentum`.
    pub fn label(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        match self.breakout {
            Some(Breakout::Hod) => parts.push("breakout_HOD"),
            Some(Breakout::Lod) => parts.push("breakout_LOD"),
            None => {}
        }
        if self.swing {
            parts.push("swing");
        }
        if self.momentum {
            parts.push("momentum");
        }
        parts.join("+")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Normal,
    Urgent,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Normal => "normal",
            Severity::Urgent => "urgent",
        }
    }
}

/// One firing decision, handed to the alert sink exactly once.
#[derive(Debug, Clone)]
pub struct AlertEvent {
    pub symbol: String,
    pub price: f64,
    /// Epoch milliseconds of the decision.
    pub ts: i64,
    pub rule: Rule,
    /// Windowed percent change, rounded to 2 decimal places.
    pub change_pct: f64,
    pub severity: Severity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_single_components() {
        let breakout = Rule {
            breakout: Some(Breakout::Hod),
            swing: false,
            momentum: false,
        };
        assert_eq!(breakout.label(), "breakout_HOD");

        let swing = Rule {
            breakout: None,
            swing: true,
            momentum: false,
        };
        assert_eq!(swing.label(), "swing");

        let momentum = Rule {
            breakout: None,
            swing: false,
            momentum: true,
        };
        assert_eq!(momentum.label(), "momentum");
    }

    #[test]
    fn label_joins_in_fixed_order() {
        let rule = Rule {
            breakout: Some(Breakout::Lod),
            swing: true,
            momentum: true,
        };
        assert_eq!(rule.label(), "breakout_LOD+swing+momentum");
    }

    #[test]
    fn inactive_rule_has_no_components() {
        let rule = Rule {
            breakout: None,
            swing: false,
            momentum: false,
        };
        assert!(!rule.is_active());
        assert_eq!(rule.label(), "");
    }

    #[test]
    fn severity_strings() {
        assert_eq!(Severity::Normal.as_str(), "normal");
        assert_eq!(Severity::Urgent.as_str(), "urgent");
    }
}
