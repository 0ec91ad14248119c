#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Image variation policy
//!
//! Device modules are split into one variant per image they install to
//! (core, ramdisk, vendor ramdisk, debug ramdisk, recovery, vendor,
//! product, plus module-declared extras). Edges bind to the variant of the
//! same image, with a fallback for dependencies that exist in a single
//! image only.

mod declared;
mod mutator;
mod variations;

pub use declared::{DeclaredImageVariants, ImageFlags};
pub use mutator::{ImageBeginMutator, ImageTransitionMutator, IMAGE, IMAGE_BEGIN};
pub use variations::{image_variations, incoming_image_variation};

use varia_transition::Pipeline;

/// Register the image mutators, in order
pub fn register_image_mutators(pipeline: &mut Pipeline) {
    pipeline
        .local(ImageBeginMutator)
        .transition(ImageTransitionMutator);
}
