//! Random face generation.

use rand::Rng;

use crate::apply::MorphTarget;
use crate::config::RandomizeOptions;
use crate::session::EditSession;

/// Give every morph not excluded by `options` a uniform random value in its
/// range, through the session setters so `target` sees each change.
/// Returns how many morphs changed.
pub fn randomize<R: Rng>(
    session: &mut EditSession,
    rng: &mut R,
    options: &RandomizeOptions,
    target: &mut dyn MorphTarget,
) -> usize {
    let mut changed = 0;
    for index in 0..session.document().morphs.len() {
        let morph = &session.document().morphs[index];
        let excluded = options
            .excluded_prefixes
            .iter()
            .any(|prefix| morph.internal_name.starts_with(prefix.as_str()));
        if excluded {
            continue;
        }
        let value = rng.gen_range(morph.min_value()..1.0);
        if session.set_morph_value(index, value, target).is_some() {
            changed += 1;
        }
    }
    changed
}
