use crate::types::{AddressComponent, GeocodeResult, NormalizedAddress};

/// City sources, lowest precedence first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum CityTier {
    AdminAreaLevel1,
    AdminAreaLevel2,
    Locality,
}

/// The single rule a component feeds; checked in this order
enum ComponentRule {
    StreetNumber,
    Route,
    City(CityTier),
    PostalCode,
}

impl ComponentRule {
    fn classify(component: &AddressComponent) -> Option<Self> {
        if component.has_type("street_number") {
            Some(Self::StreetNumber)
        } else if component.has_type("route") {
            Some(Self::Route)
        } else if component.has_type("locality") {
            Some(Self::City(CityTier::Locality))
        } else if component.has_type("administrative_area_level_2") {
            Some(Self::City(CityTier::AdminAreaLevel2))
        } else if component.has_type("administrative_area_level_1") {
            Some(Self::City(CityTier::AdminAreaLevel1))
        } else if component.has_type("postal_code") {
            Some(Self::PostalCode)
        } else {
            None
        }
    }
}

/// Extract street, city and postal code from a geocoding result.
///
/// Never fails: anything the result does not carry stays `None`.
pub fn extract_address(result: &GeocodeResult) -> NormalizedAddress {
    let mut street: Option<String> = None;
    let mut city: Option<(CityTier, &str)> = None;
    let mut postal_code: Option<&str> = None;

    for component in &result.address_components {
        let name = component.long_name.as_str();
        if name.trim().is_empty() {
            continue;
        }
        match ComponentRule::classify(component) {
            // Number goes in front of whatever route was already seen
            Some(ComponentRule::StreetNumber) => {
                street = Some(match street.take() {
                    Some(existing) => format!("{name} {existing}"),
                    None => name.to_string(),
                });
            }
            Some(ComponentRule::Route) => {
                street = Some(match street.take() {
                    Some(existing) => format!("{existing} {name}"),
                    None => name.to_string(),
                });
            }
            Some(ComponentRule::City(tier)) => {
                if city.map_or(true, |(current, _)| tier > current) {
                    city = Some((tier, name));
                }
            }
            Some(ComponentRule::PostalCode) => {
                if postal_code.is_none() {
                    postal_code = Some(name);
                }
            }
            None => {}
        }
    }

    if street.is_none() {
        street = result
            .formatted_address
            .as_deref()
            .and_then(street_from_formatted);
    }

    NormalizedAddress {
        street,
        city: city.map(|(_, name)| name.to_string()),
        postal_code: postal_code.map(str::to_string),
    }
}

/// Text before the first comma of a formatted address
fn street_from_formatted(formatted: &str) -> Option<String> {
    let first = formatted.split(',').next()?.trim();
    if first.is_empty() {
        None
    } else {
        Some(first.to_string())
    }
}
