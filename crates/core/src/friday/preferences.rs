//! Pizza preferences stored per friend.
//!
//! Every choice serializes as its human label ("Banana Peppers", "Medium Rare")
//! so the persisted JSON stays readable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::PreferenceError;

macro_rules! labeled_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// All choices in display order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = PreferenceError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($label => Ok($name::$variant),)+
                    other => Err(PreferenceError::Unknown {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

labeled_enum!(
    /// A pizza topping.
    Topping {
        BananaPeppers => "Banana Peppers",
        Basil => "Basil",
        BuffaloChicken => "Buffalo Chicken",
        BarbecueChicken => "Barbecue Chicken",
        Jalapeno => "Jalapeno",
        Pepperoni => "Pepperoni",
        Prosciutto => "Prosciutto",
        Soppressata => "Soppressata",
        Sausage => "Sausage",
        Ham => "Ham",
        Pineapple => "Pineapple",
        GreenPepper => "Green Pepper",
        Mushroom => "Mushroom",
    }
);

labeled_enum!(
    Cheese {
        ShreddedMozzarella => "Shredded Mozzarella",
        WholeMozzarella => "Whole Mozzarella",
        Cheddar => "Cheddar",
        Ricotta => "Ricotta",
        Parmesan => "Parmesan",
    }
);

labeled_enum!(
    Sauce {
        RawTomatoes => "Raw Tomatoes",
        CookedTomatoes => "Cooked Tomatoes",
        BasilPesto => "Basil Pesto",
        Vodka => "Vodka",
        Alfredo => "Alfredo",
    }
);

labeled_enum!(
    /// How well done the pizza should be.
    Doneness {
        WellDone => "Well Done",
        MediumWell => "Medium Well",
        Medium => "Medium",
        MediumRare => "Medium Rare",
        Rare => "Rare",
    }
);

/// A friend's pizza preferences. Defaults to no preference at all.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub toppings: Vec<Topping>,
    pub cheese: Vec<Cheese>,
    pub sauce: Vec<Sauce>,
    pub doneness: Option<Doneness>,
}

impl Preferences {
    /// Builds preferences from submitted labels, rejecting unknown ones.
    pub fn from_labels(
        toppings: &[&str],
        cheese: &[&str],
        sauce: &[&str],
        doneness: Option<&str>,
    ) -> Result<Self, PreferenceError> {
        Ok(Self {
            toppings: parse_all(toppings)?,
            cheese: parse_all(cheese)?,
            sauce: parse_all(sauce)?,
            doneness: doneness.map(str::parse).transpose()?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.toppings.is_empty()
            && self.cheese.is_empty()
            && self.sauce.is_empty()
            && self.doneness.is_none()
    }
}

fn parse_all<T>(labels: &[&str]) -> Result<Vec<T>, PreferenceError>
where
    T: FromStr<Err = PreferenceError> + PartialEq,
{
    let mut parsed = Vec::with_capacity(labels.len());
    for label in labels {
        let value: T = label.parse()?;
        if !parsed.contains(&value) {
            parsed.push(value);
        }
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_parse_and_display() {
        assert_eq!(
            "Banana Peppers".parse::<Topping>().unwrap(),
            Topping::BananaPeppers
        );
        assert_eq!(Doneness::MediumRare.to_string(), "Medium Rare");
        assert_eq!(Cheese::ALL.len(), 5);
    }

    #[test]
    fn test_unknown_label_is_rejected() {
        let err = "Anchovies".parse::<Topping>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown Topping: Anchovies");
    }

    #[test]
    fn test_json_uses_labels() {
        let prefs = Preferences {
            toppings: vec![Topping::GreenPepper],
            cheese: vec![],
            sauce: vec![Sauce::BasilPesto],
            doneness: Some(Doneness::WellDone),
        };

        let json = serde_json::to_string(&prefs).unwrap();
        assert!(json.contains("\"Green Pepper\""));
        assert!(json.contains("\"Well Done\""));

        let back: Preferences = serde_json::from_str(&json).unwrap();
        assert_eq!(back, prefs);
    }

    #[test]
    fn test_empty_object_decodes_to_default() {
        let prefs: Preferences = serde_json::from_str("{}").unwrap();
        assert!(prefs.is_empty());
    }

    #[test]
    fn test_from_labels_dedups() {
        let prefs =
            Preferences::from_labels(&["Basil", "Basil", "Ham"], &[], &["Vodka"], Some("Rare"))
                .unwrap();

        assert_eq!(prefs.toppings, vec![Topping::Basil, Topping::Ham]);
        assert_eq!(prefs.sauce, vec![Sauce::Vodka]);
        assert_eq!(prefs.doneness, Some(Doneness::Rare));
    }
}
