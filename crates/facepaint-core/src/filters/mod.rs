//! Filter identifiers, the registry, and the per-filter render routines.
//!
//! The registry is a closed table: every recognised identifier maps to
//! exactly one [`Filter`], and each filter to one routine. Identifiers that
//! are not in the table (including `none`) render nothing.

mod atmosphere;
mod costume;
mod creatures;
mod distortion;
mod expressions;
mod eyewear;
mod facial_hair;
mod headwear;
mod makeup;
mod pilot;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scene::Scene;

/// Identifier meaning "raw video, no overlay".
pub const NONE_ID: &str = "none";

/// The user-selected filter token. Opaque: any string is a valid selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterId(String);

impl FilterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn none() -> Self {
        Self(NONE_ID.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_none(&self) -> bool {
        self.0 == NONE_ID
    }
}

impl Default for FilterId {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Display for FilterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FilterId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<Filter> for FilterId {
    fn from(filter: Filter) -> Self {
        Self::new(filter.id())
    }
}

#[derive(Error, Debug)]
#[error("unknown filter: {0}")]
pub struct UnknownFilter(pub String);

/// Every filter with a render routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter {
    Sunglasses,
    Mustache,
    DogEars,
    Crown,
    HeartEyes,
    Rainbow,
    PartyHat,
    CowboyHat,
    Cigar,
    Beret,
    Viking,
    Pirate,
    CrazyFace,
    Hijab,
    Pilot,
    Angry,
    Army,
    Medieval,
    Alien,
    Zombie,
    Cyborg,
    Disco,
    Mime,
    Dragon,
    Magician,
    Underwater,
    Rockstar,
    Chef,
    RealisticBeard,
    MakeupGlam,
    BattleScars,
    AgingTime,
    FaceTattoos,
    SnowEffect,
    GoldenHour,
    CyberpunkNeon,
    VintageFilm,
    RainGlass,
}

/// Signature shared by every render routine.
type Routine = fn(&mut Scene<'_>);

/// Registry rows: identifier, display label, routine.
const REGISTRY: [(Filter, &str, &str, Routine); 38] = [
    (Filter::Sunglasses, "sunglasses", "Sunglasses", eyewear::sunglasses),
    (Filter::Mustache, "mustache", "Mustache", facial_hair::mustache),
    (Filter::DogEars, "dogears", "Dog Ears", headwear::dog_ears),
    (Filter::Crown, "crown", "Crown", headwear::crown),
    (Filter::HeartEyes, "heart-eyes", "Heart Eyes", eyewear::heart_eyes),
    (Filter::Rainbow, "rainbow", "Rainbow", headwear::rainbow),
    (Filter::PartyHat, "party", "Party Hat", headwear::party_hat),
    (Filter::CowboyHat, "cowboy", "Cowboy Hat", headwear::cowboy_hat),
    (Filter::Cigar, "cigar", "Cigar", facial_hair::cigar),
    (Filter::Beret, "beret", "Beret", headwear::beret),
    (Filter::Viking, "viking", "Viking Helmet", headwear::viking_helmet),
    (Filter::Pirate, "pirate", "Pirate", headwear::pirate_hat),
    (Filter::CrazyFace, "crazy-face", "Crazy Face", distortion::crazy_face),
    (Filter::Hijab, "hijab", "Hijab", costume::hijab),
    (Filter::Pilot, "pilot", "Pilot", pilot::pilot),
    (Filter::Angry, "angry", "Angry", expressions::angry),
    (Filter::Army, "army", "Army", costume::army),
    (Filter::Medieval, "medieval", "Medieval Knight", costume::medieval_knight),
    (Filter::Alien, "alien", "Alien Invasion", creatures::alien_invasion),
    (Filter::Zombie, "zombie", "Zombie Outbreak", creatures::zombie_outbreak),
    (Filter::Cyborg, "cyborg", "Cyborg", creatures::cyborg),
    (Filter::Disco, "disco", "Disco Fever", atmosphere::disco),
    (Filter::Mime, "mime", "Mime", costume::mime),
    (Filter::Dragon, "dragon", "Dragon Lord", creatures::dragon),
    (Filter::Magician, "magician", "Magic Show", costume::magician),
    (Filter::Underwater, "underwater", "Underwater Diver", atmosphere::underwater),
    (Filter::Rockstar, "rockstar", "Rock Star", costume::rockstar),
    (Filter::Chef, "chef", "Chef", costume::chef),
    (Filter::RealisticBeard, "realistic-beard", "Realistic Beard", facial_hair::realistic_beard),
    (Filter::MakeupGlam, "makeup-glam", "Makeup Glam", makeup::makeup_glam),
    (Filter::BattleScars, "battle-scars", "Battle Scars", makeup::battle_scars),
    (Filter::AgingTime, "aging-time", "Aging", makeup::aging),
    (Filter::FaceTattoos, "face-tattoos", "Face Tattoos", makeup::face_tattoos),
    (Filter::SnowEffect, "snow-effect", "Snow", atmosphere::snow),
    (Filter::GoldenHour, "golden-hour", "Golden Hour", atmosphere::golden_hour),
    (Filter::CyberpunkNeon, "cyberpunk-neon", "Cyberpunk Neon", atmosphere::cyberpunk_neon),
    (Filter::VintageFilm, "vintage-film", "Vintage Film", atmosphere::vintage_film),
    (Filter::RainGlass, "rain-glass", "Rain on Glass", atmosphere::rain_glass),
];

impl Filter {
    /// All filters in menu order.
    pub const ALL: [Filter; 38] = {
        let mut all = [Filter::Sunglasses; 38];
        let mut i = 0;
        while i < REGISTRY.len() {
            all[i] = REGISTRY[i].0;
            i += 1;
        }
        all
    };

    fn row(self) -> (Filter, &'static str, &'static str, Routine) {
        // REGISTRY is declared in enum order.
        REGISTRY[self as usize]
    }

    pub fn id(self) -> &'static str {
        self.row().1
    }

    pub fn label(self) -> &'static str {
        self.row().2
    }

    pub fn from_id(id: &str) -> Option<Filter> {
        REGISTRY.iter().find(|row| row.1 == id).map(|row| row.0)
    }

    /// Whether output changes with [`FrameTime`](crate::FrameTime).
    pub fn is_animated(self) -> bool {
        !matches!(
            self,
            Filter::Sunglasses
                | Filter::Mustache
                | Filter::DogEars
                | Filter::Crown
                | Filter::HeartEyes
                | Filter::Rainbow
                | Filter::PartyHat
                | Filter::CowboyHat
                | Filter::Cigar
                | Filter::Beret
                | Filter::Viking
                | Filter::Pirate
                | Filter::Hijab
                | Filter::Army
                | Filter::Medieval
                | Filter::Mime
                | Filter::RealisticBeard
                | Filter::MakeupGlam
                | Filter::BattleScars
                | Filter::AgingTime
                | Filter::FaceTattoos
        )
    }

    /// Whether the routine draws from the scene's random source.
    ///
    /// Such filters are only reproducible for a fixed seed.
    pub fn uses_randomness(self) -> bool {
        matches!(
            self,
            Filter::PartyHat
                | Filter::Army
                | Filter::Alien
                | Filter::Zombie
                | Filter::Cyborg
                | Filter::RealisticBeard
                | Filter::BattleScars
                | Filter::AgingTime
                | Filter::VintageFilm
        )
    }

    /// Run this filter's routine inside a saved paint state.
    pub fn render(self, scene: &mut Scene<'_>) {
        let routine = self.row().3;
        scene.canvas.save();
        routine(scene);
        scene.canvas.restore();
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Filter {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Filter::from_id(s).ok_or_else(|| UnknownFilter(s.to_string()))
    }
}

/// Resolve a selection to its filter; `none` and unknown ids resolve to nothing.
pub fn lookup(id: &FilterId) -> Option<Filter> {
    Filter::from_id(id.as_str())
}

/// Draw the overlay for `id`, returning the filter that ran.
///
/// Unrecognised identifiers are an explicit no-op.
pub fn render(id: &FilterId, scene: &mut Scene<'_>) -> Option<Filter> {
    let filter = lookup(id)?;
    filter.render(scene);
    Some(filter)
}

#[cfg(test)]
pub(crate) mod test_support {
    use image::{Rgba, RgbaImage};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::canvas::Canvas;
    use crate::landmarks::{Face, LandmarkSet};
    use crate::scene::{FrameTime, Scene};

    use super::{render, FilterId};

    pub const WIDTH: u32 = 160;
    pub const HEIGHT: u32 = 120;

    pub fn grey_frame() -> RgbaImage {
        RgbaImage::from_fn(WIDTH, HEIGHT, |x, y| {
            Rgba([(x % 200) as u8 + 30, (y % 200) as u8 + 30, 90, 255])
        })
    }

    /// Render `id` over a synthetic frame with the neutral face.
    pub fn render_still(id: &str, millis: f64, seed: u64) -> RgbaImage {
        render_face(id, &LandmarkSet::neutral(), millis, seed)
    }

    pub fn render_face(id: &str, landmarks: &LandmarkSet, millis: f64, seed: u64) -> RgbaImage {
        let frame = grey_frame();
        let mut canvas = Canvas::new(WIDTH, HEIGHT).unwrap();
        canvas.draw_image(&frame);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut scene = Scene {
            canvas: &mut canvas,
            face: Face::new(landmarks, WIDTH as f64, HEIGHT as f64),
            frame: &frame,
            time: FrameTime::from_millis(millis),
            rng: &mut rng,
        };
        render(&FilterId::new(id), &mut scene);
        canvas.image_data()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_registry_order_matches_enum() {
        for (i, row) in REGISTRY.iter().enumerate() {
            assert_eq!(row.0 as usize, i, "{} out of order", row.1);
        }
    }

    #[test]
    fn test_ids_roundtrip_and_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for filter in Filter::ALL {
            assert!(seen.insert(filter.id()));
            assert_eq!(filter.id().parse::<Filter>().unwrap(), filter);
            assert_eq!(lookup(&FilterId::from(filter)), Some(filter));
        }
        assert_eq!(seen.len(), 38);
    }

    #[test]
    fn test_none_and_unknown_resolve_to_nothing() {
        assert_eq!(lookup(&FilterId::none()), None);
        assert_eq!(lookup(&FilterId::new("sparkly-unicorn")), None);
        assert_eq!(lookup(&FilterId::new("Crown")), None);
        assert!("sparkly-unicorn".parse::<Filter>().is_err());
    }

    #[test]
    fn test_filter_id_serializes_as_plain_string() {
        let id = FilterId::new("heart-eyes");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"heart-eyes\"");
        assert!(FilterId::default().is_none());
    }

    #[test]
    fn test_every_filter_draws_something() {
        let raw = grey_frame();
        for filter in Filter::ALL {
            let out = render_still(filter.id(), 1234.0, 7);
            assert_eq!(out.dimensions(), raw.dimensions());
            assert_ne!(out, raw, "{filter} left the frame untouched");
        }
    }

    #[test]
    fn test_every_filter_is_reproducible() {
        for filter in Filter::ALL {
            let a = render_still(filter.id(), 5000.0, 42);
            let b = render_still(filter.id(), 5000.0, 42);
            assert!(a == b, "{filter} is not deterministic for a fixed time and seed");
        }
    }

    #[test]
    fn test_animated_filters_change_over_time() {
        for filter in Filter::ALL.into_iter().filter(|f| f.is_animated()) {
            let a = render_still(filter.id(), 1000.0, 1);
            let b = render_still(filter.id(), 1750.0, 1);
            assert!(a != b, "{filter} claims animation but is static");
        }
    }

    #[test]
    fn test_static_filters_ignore_time() {
        for filter in Filter::ALL
            .into_iter()
            .filter(|f| !f.is_animated() && !f.uses_randomness())
        {
            let a = render_still(filter.id(), 0.0, 3);
            let b = render_still(filter.id(), 98765.0, 3);
            assert!(a == b, "{filter} depends on time");
        }
    }

    #[test]
    fn test_random_filters_depend_on_seed() {
        // Some routines only roll dice while an effect is showing.
        for filter in Filter::ALL.into_iter().filter(|f| f.uses_randomness()) {
            let differs = [0.0, 100.0, 2000.0]
                .into_iter()
                .any(|ms| render_still(filter.id(), ms, 1) != render_still(filter.id(), ms, 2));
            assert!(differs, "{filter} claims randomness but ignores the seed");
        }
    }

    #[test]
    fn test_collapsed_and_edge_faces_do_not_panic() {
        // Zero inter-eye distance, face centred or pushed into a corner.
        for (x, y) in [(0.5, 0.5), (0.0, 0.0), (1.0, 1.0)] {
            let points = vec![crate::landmarks::NormalizedPoint::new(x, y); 468];
            let landmarks = crate::landmarks::LandmarkSet::new(points).unwrap();
            for filter in Filter::ALL {
                for ms in [0.0, 1234.0, 98765.0] {
                    let out = render_face(filter.id(), &landmarks, ms, 11);
                    assert_eq!(out.dimensions(), (WIDTH, HEIGHT), "{filter} at ({x}, {y})");
                }
            }
        }
    }

    #[test]
    fn test_render_restores_paint_state() {
        let frame = grey_frame();
        let landmarks = crate::landmarks::LandmarkSet::neutral();
        let mut canvas = crate::canvas::Canvas::new(WIDTH, HEIGHT).unwrap();
        let mut rng = rand::rngs::mock::StepRng::new(0, 1 << 40);
        for filter in Filter::ALL {
            let mut scene = Scene {
                canvas: &mut canvas,
                face: crate::landmarks::Face::new(&landmarks, WIDTH as f64, HEIGHT as f64),
                frame: &frame,
                time: crate::scene::FrameTime::from_millis(10.0),
                rng: &mut rng,
            };
            filter.render(&mut scene);
            // Default state: a 1px black line width survives every routine.
            assert_eq!(canvas.line_width(), 1.0, "{filter} leaked paint state");
        }
    }
}
