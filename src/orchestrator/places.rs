use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::config::Config;
use crate::dispatch::chain::{ChainLink, ChainOutcome, ProviderChain};
use crate::dispatch::http::HttpDispatch;
use crate::error::ApiError;
use crate::geo;
use crate::limits::cooldown::CooldownTracker;
use crate::model::{Place, PlaceQuery};
use crate::providers::overpass::{OsmElement, OverpassMirror, OverpassQuery};

/// Most places returned to a client.
pub const MAX_PLACES: usize = 50;
/// `out center N` cap sent to the server, independent of `MAX_PLACES`.
pub const SERVER_RESULT_LIMIT: usize = 100;
/// Overpass-side execution budget and per-mirror HTTP timeout.
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(15);

const FALLBACK_ADDRESS: &str = "Near you";

#[derive(Debug, Error)]
pub enum PlacesError {
    #[error("all {mirrors} place data endpoints failed")]
    AllEndpointsFailed { mirrors: usize },
}

impl From<PlacesError> for ApiError {
    fn from(_: PlacesError) -> Self {
        ApiError::PlacesUnavailable
    }
}

#[derive(Debug, Clone)]
pub struct NearbyPlaces {
    pub places: Vec<Place>,
    pub total: usize,
    pub provider: String,
}

/// One `[...]` predicate of an Overpass selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagFilter {
    Equals(&'static str, &'static str),
    OneOf(&'static str, &'static [&'static str]),
    Exists(&'static str),
}

impl TagFilter {
    pub fn render(&self) -> String {
        match self {
            Self::Equals(key, value) => format!("[\"{key}\"=\"{value}\"]"),
            Self::OneOf(key, values) => format!("[\"{key}\"~\"^({})$\"]", values.join("|")),
            Self::Exists(key) => format!("[\"{key}\"]"),
        }
    }
}

const BROAD_FILTERS: &[TagFilter] = &[
    TagFilter::OneOf(
        "amenity",
        &[
            "restaurant",
            "cafe",
            "fast_food",
            "hospital",
            "clinic",
            "pharmacy",
            "atm",
            "bank",
            "fuel",
            "police",
            "bus_station",
        ],
    ),
    TagFilter::OneOf(
        "tourism",
        &["hotel", "guest_house", "hostel", "attraction", "museum", "viewpoint"],
    ),
    TagFilter::Exists("shop"),
];

/// Map a client category to Overpass predicates. Absent, `all` and unknown
/// categories get the broad multi-category selection.
pub fn category_filters(category: Option<&str>) -> Vec<TagFilter> {
    let normalized = category.map(|c| c.trim().to_lowercase());
    let filters: &[TagFilter] = match normalized.as_deref() {
        Some("restaurant" | "restaurants") => &[TagFilter::Equals("amenity", "restaurant")],
        Some("food") => &[TagFilter::OneOf(
            "amenity",
            &["restaurant", "cafe", "fast_food", "food_court"],
        )],
        Some("cafe" | "cafes") => &[TagFilter::Equals("amenity", "cafe")],
        Some("hotel" | "hotels" | "lodging") => &[TagFilter::OneOf(
            "tourism",
            &["hotel", "guest_house", "hostel", "motel", "apartment"],
        )],
        Some("hospital" | "hospitals" | "medical") => &[TagFilter::OneOf(
            "amenity",
            &["hospital", "clinic", "doctors"],
        )],
        Some("pharmacy") => &[TagFilter::Equals("amenity", "pharmacy")],
        Some("atm") => &[TagFilter::Equals("amenity", "atm")],
        Some("bank") => &[TagFilter::OneOf("amenity", &["bank", "atm"])],
        Some("fuel" | "petrol") => &[TagFilter::Equals("amenity", "fuel")],
        Some("police") => &[TagFilter::Equals("amenity", "police")],
        Some("attraction" | "attractions" | "tourist") => &[TagFilter::OneOf(
            "tourism",
            &["attraction", "viewpoint", "museum", "artwork", "gallery"],
        )],
        Some("museum") => &[TagFilter::Equals("tourism", "museum")],
        Some("beach" | "beaches") => &[TagFilter::Equals("natural", "beach")],
        Some("shopping" | "shop" | "shops") => &[TagFilter::Exists("shop")],
        Some("worship" | "temple" | "church") => &[TagFilter::Equals("amenity", "place_of_worship")],
        Some("transport") => &[TagFilter::OneOf(
            "amenity",
            &["bus_station", "taxi", "ferry_terminal", "car_rental"],
        )],
        _ => BROAD_FILTERS,
    };
    filters.to_vec()
}

/// Single Overpass QL request covering nodes and ways within the radius.
pub fn build_query(query: &PlaceQuery) -> OverpassQuery {
    let around = format!(
        "(around:{},{},{})",
        query.radius_m.round(),
        query.latitude,
        query.longitude
    );
    let mut selectors = String::new();
    for filter in category_filters(query.category.as_deref()) {
        let predicate = filter.render();
        for kind in ["node", "way"] {
            selectors.push_str(&format!("  {kind}{predicate}{around};\n"));
        }
    }
    OverpassQuery(format!(
        "[out:json][timeout:{}];\n(\n{selectors});\nout center {SERVER_RESULT_LIMIT};",
        QUERY_TIMEOUT.as_secs()
    ))
}

fn category_label(element: &OsmElement) -> String {
    if let Some(amenity) = element.tags.get("amenity") {
        amenity.clone()
    } else if let Some(tourism) = element.tags.get("tourism") {
        tourism.clone()
    } else if element.tags.contains_key("shop") {
        "shopping".to_string()
    } else {
        "place".to_string()
    }
}

fn address(element: &OsmElement) -> String {
    let tag = |k: &str| {
        element
            .tags
            .get(k)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    };
    if let Some(street) = tag("addr:street") {
        return match tag("addr:housenumber") {
            Some(number) => format!("{street} {number}"),
            None => street.to_string(),
        };
    }
    tag("addr:city")
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK_ADDRESS.to_string())
}

/// Turn raw elements into the client list: named only, within the radius,
/// nearest first, at most `MAX_PLACES`.
pub fn post_process(elements: Vec<OsmElement>, query: &PlaceQuery) -> Vec<Place> {
    let radius_km = query.radius_km();

    let mut ranked: Vec<(f64, Place)> = elements
        .into_iter()
        .filter_map(|element| {
            let name = element
                .tags
                .get("name")
                .map(|n| n.trim())
                .filter(|n| !n.is_empty())?
                .to_string();
            let position = geo::element_position(&element)?;
            let raw_km =
                geo::haversine_km(query.latitude, query.longitude, position.lat, position.lon);
            let distance = geo::round1(raw_km);
            // Rounding up can push a place inside the radius past it, so both must fit.
            if raw_km.is_nan() || raw_km > radius_km || distance > radius_km {
                return None;
            }

            let tag = |k: &str| element.tags.get(k).cloned();
            let place = Place {
                id: format!("{}/{}", element.kind, element.id),
                name,
                category: category_label(&element),
                distance,
                address: address(&element),
                latitude: position.lat,
                longitude: position.lon,
                phone: tag("phone").or_else(|| tag("contact:phone")),
                website: tag("website").or_else(|| tag("contact:website")),
                opening_hours: tag("opening_hours"),
            };
            Some((raw_km, place))
        })
        .collect();

    ranked.sort_by(|a, b| a.0.total_cmp(&b.0));
    ranked.truncate(MAX_PLACES);
    ranked.into_iter().map(|(_, place)| place).collect()
}

pub struct PlaceDiscovery {
    chain: ProviderChain<OverpassQuery, Vec<OsmElement>>,
}

impl PlaceDiscovery {
    pub fn new(chain: ProviderChain<OverpassQuery, Vec<OsmElement>>) -> Self {
        Self { chain }
    }

    /// One chain link per configured Overpass mirror, in configured order.
    pub fn from_config(config: &Config, http: HttpDispatch, cooldowns: Arc<CooldownTracker>) -> Self {
        let timeout = QUERY_TIMEOUT.min(config.provider_timeout);
        let chain = config.endpoints.overpass.iter().fold(
            ProviderChain::<OverpassQuery, Vec<OsmElement>>::new("places", cooldowns),
            |chain, url| {
                let mirror = OverpassMirror::new(http.clone(), url, timeout);
                let cooldown = config.cooldown.for_provider(mirror.mirror_id());
                chain.link(ChainLink::new(mirror).with_cooldown(cooldown))
            },
        );
        Self::new(chain)
    }

    pub fn provider_order(&self) -> Vec<&str> {
        self.chain.order()
    }

    /// Fails only when every mirror failed; an empty area is a success with
    /// no places.
    pub async fn find_nearby(&self, query: &PlaceQuery) -> Result<NearbyPlaces, PlacesError> {
        let overpass = build_query(query);
        tracing::debug!(query = overpass.as_str(), "overpass query");

        match self.chain.run(&overpass).await {
            ChainOutcome::Success {
                response, provider, ..
            } => {
                let raw = response.len();
                let places = post_process(response, query);
                tracing::info!(provider = provider.as_str(), raw, kept = places.len(), "nearby places resolved");
                Ok(NearbyPlaces {
                    total: places.len(),
                    places,
                    provider,
                })
            }
            ChainOutcome::Exhausted { attempts } => Err(PlacesError::AllEndpointsFailed {
                mirrors: attempts.len(),
            }),
        }
    }
}
