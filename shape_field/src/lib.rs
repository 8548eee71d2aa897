//! # shape_field
//!
//! Target geometry and coloring for the gesture-driven particle field.
//!
//! * [`generate`] samples `count` independent target points from one of four
//!   shape distributions.
//! * [`colorize`] derives one color per target from the shape's gradient rule.
//!
//! Both take the random source as a parameter, so a seeded `StdRng` makes the
//! output reproducible:
//!
//! ```rust
//! use rand::{rngs::StdRng, SeedableRng};
//! use shape_field::{colorize, generate, Rgb, Shape};
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let targets = generate(Shape::Heart, 1_000, &mut rng);
//! let colors  = colorize(&targets, Shape::Heart, Rgb::from_u32(0xFF0000), &mut rng);
//! assert_eq!(targets.len(), colors.len());
//! ```
//!
//! ## Shapes
//!
//! | Shape | Distribution | Colors |
//! |---|---|---|
//! | Starfield | uniform ball, r = 5 | base color |
//! | Flower | 6 layers × 8 petals, nearly flat | gold → deep pink → dark violet |
//! | Fireworks | uniform ball, r = 3 | white / yellow / orange-red sparks |
//! | Heart | parametric heart curve, outline-heavy | dark red → tomato |

pub mod color;
pub mod shape;

pub use color::{colorize, ColorError, Gradient, Rgb};
pub use shape::{generate, ParseShapeError, Sampler, Shape, ShapeProfile};
