use crate::loader::{LoadedShader, SourceStamps, StagePair};
use crate::stage::ShaderError;

/// The hot-reloaded effect program and the error program it falls back to.
///
/// # Invariants
/// - The fallback program exists for the whole lifetime of the slots.
/// - [`ShaderSlots::bound`] always yields a fully compiled program: either the
///   effect or the fallback, never anything in between.
/// - A replaced effect program is dropped (released) when the new load is installed.
#[derive(Debug)]
pub struct ShaderSlots<P> {
    pair: StagePair,
    fallback: P,
    effect: Option<P>,
    stamps: SourceStamps,
}

impl<P> ShaderSlots<P> {
    /// Slots tracking `pair`, initially bound to `fallback` until a load is installed.
    pub fn new(pair: StagePair, fallback: P) -> Self {
        Self {
            pair,
            fallback,
            effect: None,
            stamps: SourceStamps::default(),
        }
    }

    pub fn pair(&self) -> &StagePair {
        &self.pair
    }

    /// Stamps of the sources behind the last installed load, failed or not.
    pub fn stamps(&self) -> &SourceStamps {
        &self.stamps
    }

    /// Replace the effect with `loaded`.
    ///
    /// On failure the old effect is released as well and the fallback becomes
    /// bound. The stamps are recorded either way, so a broken file is not
    /// retried until it changes again.
    pub fn install(&mut self, loaded: LoadedShader<P>) -> Result<(), ShaderError> {
        self.stamps = loaded.stamps;
        match loaded.program {
            Ok(program) => {
                self.effect = Some(program);
                Ok(())
            }
            Err(e) => {
                self.effect = None;
                Err(e)
            }
        }
    }

    pub fn bound(&self) -> &P {
        self.effect.as_ref().unwrap_or(&self.fallback)
    }

    pub fn is_fallback_bound(&self) -> bool {
        self.effect.is_none()
    }
}
