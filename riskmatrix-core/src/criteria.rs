//! Control quality criteria and their fixed point tables.
//!
//! Each criterion is a closed set of options. Options are selected by label;
//! both the long descriptive labels and the short form keys are accepted,
//! matched case- and accent-insensitively.

use crate::error::ScoringError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lowercase, trim, and strip Spanish diacritics for label matching.
pub(crate) fn normalize_label(label: &str) -> String {
    label
        .trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' | 'ü' => 'u',
            other => other,
        })
        .collect()
}

macro_rules! criterion_option {
    (
        $(#[$meta:meta])*
        $name:ident, $criterion:expr, {
            $( $(#[$vmeta:meta])* $variant:ident => $points:expr, [$($label:expr),+ $(,)?] ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            pub const CRITERION: &'static str = $criterion;
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Fixed point value (0-100) of this option.
            pub fn points(self) -> f64 {
                match self {
                    $($name::$variant => $points),+
                }
            }

            fn labels(self) -> &'static [&'static str] {
                match self {
                    $($name::$variant => &[$($label),+]),+
                }
            }

            /// Canonical label.
            pub fn label(self) -> &'static str {
                self.labels()[0]
            }

            pub fn from_label(label: &str) -> Result<Self, ScoringError> {
                let wanted = normalize_label(label);
                Self::ALL
                    .iter()
                    .copied()
                    .find(|option| {
                        option
                            .labels()
                            .iter()
                            .any(|l| normalize_label(l) == wanted)
                    })
                    .ok_or_else(|| ScoringError::UnknownOption {
                        criterion: $criterion,
                        label: label.to_string(),
                    })
            }
        }

        impl FromStr for $name {
            type Err = ScoringError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_label(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = ScoringError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::from_label(&value)
            }
        }

        impl From<$name> for String {
            fn from(option: $name) -> Self {
                option.label().to_string()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.label())
            }
        }
    };
}

criterion_option!(
    /// Whether the control is documented and leaves evidence (aplicabilidad).
    Applicability, "aplicabilidad", {
        Documented => 100.0, [
            "Cuenta con procedimientos documentados y se deja evidencia de su ejecución",
            "totalmente",
        ],
        NoEvidence => 30.0, [
            "Cuenta con procedimientos documentados total o parcialmente pero no se deja evidencia de su ejecución",
            "parcial",
        ],
        Undocumented => 0.0, [
            "No se deja evidencia de su ejecución, ni se cuenta con los procedimientos documentados",
            "nula",
        ],
    }
);

criterion_option!(
    /// How much of the population the control covers (cobertura).
    Coverage, "cobertura", {
        FullPopulation => 100.0, [
            "La frecuencia del control tiene una periodicidad definida y se realiza sobre la totalidad de la población",
            "total",
        ],
        Sample => 70.0, [
            "La frecuencia del control tiene una periodicidad definida y se hace sobre una muestra de la población",
            "significativa",
        ],
        Discretionary => 10.0, [
            "La frecuencia del control es eventual o a discreción del funcionario que realiza el control",
            "minima",
        ],
    }
);

criterion_option!(
    /// Complexity of the control relative to the risk (facilidadUso).
    EaseOfUse, "facilidadUso", {
        Proportionate => 100.0, [
            "La complejidad del control es coherente con el riesgo identificado y la actividad realizada",
            "facil",
        ],
        TooComplex => 70.0, [
            "El control es muy complejo en su ejecución en comparación con el riesgo identificado y la actividad realizada, y requiere simplificación",
            "moderada",
        ],
        TooSimple => 30.0, [
            "El control es muy sencillo en comparación con el riesgo identificado y la actividad realizada, y requiere mayor profundización",
            "dificil",
        ],
    }
);

criterion_option!(
    /// Segregation of duties between execution and review (segregacion).
    Segregation, "segregacion", {
        Segregated => 100.0, ["Sí", "si"],
        NotSegregated => 0.0, ["NO"],
    }
);

criterion_option!(
    /// Degree of automation of the control (naturaleza).
    Nature, "naturaleza", {
        Automatic => 100.0, ["Automático", "preventivo"],
        SemiAutomatic => 60.0, ["Semiautomático", "detective"],
        Manual => 40.0, ["Manual", "correctivo"],
    }
);

/// Selected options for the five criteria. Unselected criteria score 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ControlCriteria {
    pub aplicabilidad: Option<Applicability>,
    pub cobertura: Option<Coverage>,
    pub facilidad_uso: Option<EaseOfUse>,
    pub segregacion: Option<Segregation>,
    pub naturaleza: Option<Nature>,
}

impl ControlCriteria {
    /// Resolve selections into point values.
    pub fn scores(&self) -> CriterionScores {
        CriterionScores {
            aplicabilidad: self.aplicabilidad.map_or(0.0, Applicability::points),
            cobertura: self.cobertura.map_or(0.0, Coverage::points),
            facilidad_uso: self.facilidad_uso.map_or(0.0, EaseOfUse::points),
            segregacion: self.segregacion.map_or(0.0, Segregation::points),
            naturaleza: self.naturaleza.map_or(0.0, Nature::points),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.aplicabilidad.is_some()
            && self.cobertura.is_some()
            && self.facilidad_uso.is_some()
            && self.segregacion.is_some()
            && self.naturaleza.is_some()
    }
}

/// Raw point values (0-100) per criterion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CriterionScores {
    pub aplicabilidad: f64,
    pub cobertura: f64,
    pub facilidad_uso: f64,
    pub segregacion: f64,
    pub naturaleza: f64,
}

impl CriterionScores {
    pub fn uniform(points: f64) -> Self {
        Self {
            aplicabilidad: points,
            cobertura: points,
            facilidad_uso: points,
            segregacion: points,
            naturaleza: points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_and_short_labels_match() {
        assert_eq!(
            Applicability::from_label("totalmente").unwrap(),
            Applicability::Documented
        );
        assert_eq!(
            Applicability::from_label(
                "Cuenta con procedimientos documentados y se deja evidencia de su ejecución"
            )
            .unwrap(),
            Applicability::Documented
        );
        assert_eq!(Coverage::from_label("minima").unwrap().points(), 10.0);
    }

    #[test]
    fn test_accent_and_case_insensitive() {
        assert_eq!(Segregation::from_label("SI").unwrap(), Segregation::Segregated);
        assert_eq!(Segregation::from_label("sí").unwrap(), Segregation::Segregated);
        assert_eq!(Nature::from_label("automatico").unwrap(), Nature::Automatic);
        assert_eq!(EaseOfUse::from_label(" Difícil ").unwrap(), EaseOfUse::TooSimple);
    }

    #[test]
    fn test_unknown_label_errors() {
        let err = Nature::from_label("robotic").unwrap_err();
        assert_eq!(
            err,
            ScoringError::UnknownOption {
                criterion: "naturaleza",
                label: "robotic".into()
            }
        );
    }

    #[test]
    fn test_point_tables() {
        let points: Vec<f64> = Nature::ALL.iter().map(|n| n.points()).collect();
        assert_eq!(points, vec![100.0, 60.0, 40.0]);
        let points: Vec<f64> = Applicability::ALL.iter().map(|n| n.points()).collect();
        assert_eq!(points, vec![100.0, 30.0, 0.0]);
        assert_eq!(EaseOfUse::TooComplex.points(), 70.0);
        assert_eq!(Segregation::NotSegregated.points(), 0.0);
    }

    #[test]
    fn test_missing_selection_scores_zero() {
        let criteria = ControlCriteria {
            naturaleza: Some(Nature::Manual),
            ..Default::default()
        };
        let scores = criteria.scores();
        assert_eq!(scores.naturaleza, 40.0);
        assert_eq!(scores.aplicabilidad, 0.0);
        assert!(!criteria.is_complete());
    }

    #[test]
    fn test_criteria_deserialize_from_labels() {
        let criteria: ControlCriteria = serde_json::from_str(
            r#"{"aplicabilidad": "parcial", "facilidadUso": "facil", "naturaleza": "Semiautomático"}"#,
        )
        .unwrap();
        assert_eq!(criteria.aplicabilidad, Some(Applicability::NoEvidence));
        assert_eq!(criteria.facilidad_uso, Some(EaseOfUse::Proportionate));
        assert_eq!(criteria.cobertura, None);

        let json = serde_json::to_value(criteria).unwrap();
        assert_eq!(json["naturaleza"], "Semiautomático");
    }
}
