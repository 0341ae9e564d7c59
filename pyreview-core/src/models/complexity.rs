//! Complexity analyzer output: raw size metrics and per-unit complexity

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write as _;

/// Raw size metrics as reported by `radon raw`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMetrics {
    pub loc: u64,
    pub lloc: u64,
    pub sloc: u64,
    pub comments: u64,
    #[serde(default)]
    pub multi: u64,
    pub blank: u64,
    pub single_comments: u64,
}

/// Kind of block a complexity score belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Function,
    Method,
    Class,
}

impl UnitKind {
    /// Functions and methods count towards the average; classes do not
    pub const fn is_callable(self) -> bool {
        matches!(self, Self::Function | Self::Method)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Function => "Function",
            Self::Method => "Method",
            Self::Class => "Class",
        }
    }
}

/// Letter grade assigned by the complexity tool (A best, F worst)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    A,
    B,
    C,
    D,
    E,
    F,
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let letter = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
            Self::F => "F",
        };
        f.write_str(letter)
    }
}

/// One function, method or class with its score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexityUnit {
    #[serde(rename = "type")]
    pub kind: UnitKind,
    pub name: String,
    #[serde(default)]
    pub classname: Option<String>,
    pub complexity: u32,
    pub rank: Rank,
    #[serde(default)]
    pub lineno: Option<u32>,
}

/// Everything the complexity adapter extracts for one source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexityMetrics {
    pub raw: RawMetrics,
    /// Top-level functions first, then each class followed by its methods
    pub units: Vec<ComplexityUnit>,
}

impl ComplexityMetrics {
    /// Metrics with `units` put in listing order
    pub fn new(raw: RawMetrics, units: Vec<ComplexityUnit>) -> Self {
        Self {
            raw,
            units: in_listing_order(units),
        }
    }

    /// Number of functions and methods
    pub fn function_count(&self) -> usize {
        self.callables().count()
    }

    /// Mean complexity over functions and methods; `None` when there are none
    #[allow(clippy::cast_precision_loss)]
    pub fn average_complexity(&self) -> Option<f64> {
        let (total, count) = self
            .callables()
            .fold((0_u64, 0_u32), |(total, count), unit| {
                (total + u64::from(unit.complexity), count + 1)
            });

        if count == 0 {
            None
        } else {
            Some(total as f64 / f64::from(count))
        }
    }

    fn callables(&self) -> impl Iterator<Item = &ComplexityUnit> {
        self.units.iter().filter(|unit| unit.kind.is_callable())
    }

    /// Section text: raw metrics block, then one line per unit
    pub fn render_section(&self) -> String {
        let raw = &self.raw;
        let mut report = String::from("**Raw Metrics:**\n");
        let _ = writeln!(report, "- Lines of Code (LOC): {}", raw.loc);
        let _ = writeln!(report, "- Logical Lines of Code (LLOC): {}", raw.lloc);
        let _ = writeln!(report, "- Source Lines of Code (SLOC): {}", raw.sloc);
        let _ = writeln!(report, "- Comment Lines: {}", raw.comments);
        let _ = writeln!(report, "- Single-line Comments: {}", raw.single_comments);
        let _ = writeln!(report, "- Blank Lines: {}\n", raw.blank);

        report.push_str("**Cyclomatic Complexity:**\n");
        if self.units.is_empty() {
            report.push_str("- No functions/methods found.\n");
        }
        for unit in &self.units {
            let _ = writeln!(
                report,
                "- **{} `{}`**: Complexity: **{}** (Rank: **{}**)",
                unit.kind.label(),
                unit.name,
                unit.complexity,
                unit.rank
            );
        }

        report
    }
}

/// Order units like radon's visitor lists them: top-level functions by line,
/// then each class by line, each class directly followed by its methods.
pub fn in_listing_order(mut units: Vec<ComplexityUnit>) -> Vec<ComplexityUnit> {
    let class_lines: HashMap<String, u32> = units
        .iter()
        .filter(|unit| unit.kind == UnitKind::Class)
        .map(|unit| (unit.name.clone(), unit.lineno.unwrap_or(0)))
        .collect();

    units.sort_by_key(|unit| {
        let line = unit.lineno.unwrap_or(0);
        match unit.kind {
            UnitKind::Function => (0, line, 0, line),
            UnitKind::Class => (1, line, 0, line),
            UnitKind::Method => {
                let class_line = unit
                    .classname
                    .as_ref()
                    .and_then(|name| class_lines.get(name))
                    .copied()
                    .unwrap_or(line);
                (1, class_line, 1, line)
            }
        }
    });
    units
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(kind: UnitKind, name: &str, complexity: u32, rank: Rank) -> ComplexityUnit {
        ComplexityUnit {
            kind,
            name: name.to_string(),
            classname: None,
            complexity,
            rank,
            lineno: None,
        }
    }

    #[test]
    fn test_average_excludes_classes() {
        let metrics = ComplexityMetrics {
            raw: RawMetrics::default(),
            units: vec![
                unit(UnitKind::Class, "Widget", 9, Rank::B),
                unit(UnitKind::Method, "render", 3, Rank::A),
                unit(UnitKind::Function, "main", 1, Rank::A),
            ],
        };

        assert_eq!(metrics.function_count(), 2);
        assert_eq!(metrics.average_complexity(), Some(2.0));
    }

    #[test]
    fn test_average_undefined_without_callables() {
        let metrics = ComplexityMetrics {
            raw: RawMetrics::default(),
            units: vec![unit(UnitKind::Class, "Empty", 1, Rank::A)],
        };

        assert_eq!(metrics.function_count(), 0);
        assert_eq!(metrics.average_complexity(), None);
        assert_eq!(ComplexityMetrics::default().average_complexity(), None);
    }

    #[test]
    fn test_render_section_lists_units() {
        let metrics = ComplexityMetrics {
            raw: RawMetrics {
                loc: 4,
                lloc: 4,
                sloc: 4,
                ..RawMetrics::default()
            },
            units: vec![unit(UnitKind::Function, "f", 2, Rank::A)],
        };

        let text = metrics.render_section();
        assert!(text.starts_with("**Raw Metrics:**\n- Lines of Code (LOC): 4\n"));
        assert!(text.contains("- Blank Lines: 0\n\n**Cyclomatic Complexity:**\n"));
        assert!(text.contains("- **Function `f`**: Complexity: **2** (Rank: **A**)\n"));
        assert!(!text.contains("No functions/methods found"));
    }

    #[test]
    fn test_render_section_without_units() {
        let text = ComplexityMetrics::default().render_section();
        assert!(text.ends_with("**Cyclomatic Complexity:**\n- No functions/methods found.\n"));
    }

    fn at(mut unit: ComplexityUnit, lineno: u32, classname: Option<&str>) -> ComplexityUnit {
        unit.lineno = Some(lineno);
        unit.classname = classname.map(ToString::to_string);
        unit
    }

    #[test]
    fn test_listing_order_puts_functions_before_classes() {
        // Score order, as `radon cc` prints by default
        let units = vec![
            at(unit(UnitKind::Function, "b", 3, Rank::A), 4, None),
            at(unit(UnitKind::Method, "run", 2, Rank::A), 12, Some("Job")),
            at(unit(UnitKind::Class, "Job", 2, Rank::A), 10, None),
            at(unit(UnitKind::Function, "a", 1, Rank::A), 1, None),
            at(unit(UnitKind::Class, "Early", 1, Rank::A), 2, None),
            at(unit(UnitKind::Method, "stop", 1, Rank::A), 16, Some("Job")),
        ];

        let names: Vec<String> = in_listing_order(units)
            .into_iter()
            .map(|unit| unit.name)
            .collect();
        assert_eq!(names, ["a", "b", "Early", "Job", "run", "stop"]);
    }

    #[test]
    fn test_new_orders_units() {
        let metrics = ComplexityMetrics::new(
            RawMetrics::default(),
            vec![
                at(unit(UnitKind::Function, "b", 3, Rank::A), 3, None),
                at(unit(UnitKind::Function, "a", 1, Rank::A), 1, None),
            ],
        );

        let text = metrics.render_section();
        let a = text.find("`a`").unwrap();
        let b = text.find("`b`").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_unit_deserializes_from_radon_block() {
        let block = serde_json::json!({
            "type": "method",
            "rank": "B",
            "name": "process",
            "classname": "Worker",
            "complexity": 7,
            "lineno": 12,
            "col_offset": 4,
            "endline": 30,
            "closures": []
        });

        let parsed: ComplexityUnit = serde_json::from_value(block).unwrap();
        assert_eq!(parsed.kind, UnitKind::Method);
        assert_eq!(parsed.rank, Rank::B);
        assert_eq!(parsed.classname.as_deref(), Some("Worker"));
        assert_eq!(parsed.complexity, 7);
    }
}
