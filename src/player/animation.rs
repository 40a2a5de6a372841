//! Animation state selection and cross-fading.
//!
//! Clips are bound to states once, when the rig is attached. Each frame the
//! selector picks a state from the locomotion result and, on a change, fades
//! the old clip out while the new one fades in over the same duration.

use rustc_hash::FxHashMap;

use crate::constants::BIND_POSE_CLIP;
use crate::error::RigError;
use crate::rig::{ClipPlayback, LoopMode};
use crate::utils::settings::{AnimationSettings, ClipNames, TimeScales};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationState {
    Idle,
    Walk,
    Run,
    Jump,
}

impl AnimationState {
    pub const ALL: [AnimationState; 4] = [
        AnimationState::Idle,
        AnimationState::Walk,
        AnimationState::Run,
        AnimationState::Jump,
    ];

    /// Airborne wins over movement; movement picks run or walk.
    pub fn select(moving: bool, running: bool, grounded: bool) -> Self {
        if !grounded {
            AnimationState::Jump
        } else if moving && running {
            AnimationState::Run
        } else if moving {
            AnimationState::Walk
        } else {
            AnimationState::Idle
        }
    }

    fn index(self) -> usize {
        match self {
            AnimationState::Idle => 0,
            AnimationState::Walk => 1,
            AnimationState::Run => 2,
            AnimationState::Jump => 3,
        }
    }

    fn clip_name(self, names: &ClipNames) -> &str {
        match self {
            AnimationState::Idle => &names.idle,
            AnimationState::Walk => &names.walk,
            AnimationState::Run => &names.run,
            AnimationState::Jump => &names.jump,
        }
    }

    fn time_scale(self, scales: &TimeScales) -> f32 {
        match self {
            AnimationState::Idle => scales.idle,
            AnimationState::Walk => scales.walk,
            AnimationState::Run => scales.run,
            AnimationState::Jump => scales.jump,
        }
    }

    fn loop_mode(self) -> LoopMode {
        match self {
            AnimationState::Jump => LoopMode::Once,
            _ => LoopMode::Repeat,
        }
    }
}

/// Exhaustive state -> clip mapping.
///
/// States without a clip of their own share the idle clip.
pub struct ClipBinding<H> {
    handles: Vec<H>,
    slots: [usize; 4],
}

impl<H> ClipBinding<H> {
    pub fn bind(clips: Vec<(String, H)>, names: &ClipNames) -> Result<Self, RigError> {
        let mut available: FxHashMap<String, H> = FxHashMap::default();
        for (name, handle) in clips {
            if name == BIND_POSE_CLIP {
                continue;
            }
            if available.insert(name.clone(), handle).is_some() {
                tracing::warn!("Rig has more than one clip named {}, keeping the last", name);
            }
        }

        let mut handles = Vec::new();
        let mut bound: FxHashMap<String, usize> = FxHashMap::default();
        let mut slots = [0usize; 4];

        for state in AnimationState::ALL {
            let wanted = state.clip_name(names);
            let resolved = take_clip(&mut available, &bound, wanted);

            slots[state.index()] = match resolved {
                Some(Resolved::Bound(slot)) => slot,
                Some(Resolved::Taken(name, handle)) => {
                    handles.push(handle);
                    let slot = handles.len() - 1;
                    bound.insert(name, slot);
                    slot
                }
                None if state == AnimationState::Idle => {
                    return Err(RigError::MissingDefaultClip {
                        name: wanted.to_string(),
                    });
                }
                None => {
                    tracing::warn!(
                        "Rig has no clip named {} for {:?}, falling back to idle",
                        wanted,
                        state
                    );
                    slots[AnimationState::Idle.index()]
                }
            };
        }

        if !available.is_empty() {
            let mut unused: Vec<_> = available.keys().map(String::as_str).collect();
            unused.sort_unstable();
            tracing::debug!("Unused rig clips: {:?}", unused);
        }

        Ok(ClipBinding { handles, slots })
    }

    pub fn get(&self, state: AnimationState) -> &H {
        &self.handles[self.slots[state.index()]]
    }

    fn get_mut(&mut self, state: AnimationState) -> &mut H {
        &mut self.handles[self.slots[state.index()]]
    }

    /// True when the state has its own clip rather than the idle fallback.
    pub fn has_own_clip(&self, state: AnimationState) -> bool {
        state == AnimationState::Idle
            || self.slots[state.index()] != self.slots[AnimationState::Idle.index()]
    }

    pub fn shares_clip(&self, a: AnimationState, b: AnimationState) -> bool {
        self.slots[a.index()] == self.slots[b.index()]
    }
}

enum Resolved<H> {
    Bound(usize),
    Taken(String, H),
}

/// Exact name first, then a case-insensitive match.
fn take_clip<H>(
    available: &mut FxHashMap<String, H>,
    bound: &FxHashMap<String, usize>,
    wanted: &str,
) -> Option<Resolved<H>> {
    if let Some(&slot) = bound.get(wanted) {
        return Some(Resolved::Bound(slot));
    }
    if let Some(handle) = available.remove(wanted) {
        return Some(Resolved::Taken(wanted.to_string(), handle));
    }
    if let Some((_, &slot)) = bound.iter().find(|(name, _)| name.eq_ignore_ascii_case(wanted)) {
        return Some(Resolved::Bound(slot));
    }
    let key = available
        .keys()
        .find(|name| name.eq_ignore_ascii_case(wanted))
        .cloned()?;
    let handle = available.remove(&key)?;
    Some(Resolved::Taken(key, handle))
}

/// One side of a cross-fade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeSlot {
    pub state: AnimationState,
    pub remaining: f32,
}

/// Two-slot record of the fade in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossFade {
    pub outgoing: FadeSlot,
    pub incoming: FadeSlot,
    pub duration: f32,
}

impl CrossFade {
    pub fn new(from: AnimationState, to: AnimationState, duration: f32) -> Self {
        CrossFade {
            outgoing: FadeSlot {
                state: from,
                remaining: duration,
            },
            incoming: FadeSlot {
                state: to,
                remaining: duration,
            },
            duration,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.outgoing.remaining = (self.outgoing.remaining - dt).max(0.0);
        self.incoming.remaining = (self.incoming.remaining - dt).max(0.0);
    }

    pub fn is_finished(&self) -> bool {
        self.outgoing.remaining <= 0.0 && self.incoming.remaining <= 0.0
    }

    pub fn outgoing_weight(&self) -> f32 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        self.outgoing.remaining / self.duration
    }

    pub fn incoming_weight(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        1.0 - self.incoming.remaining / self.duration
    }
}

pub struct AnimationSelector<H> {
    clips: ClipBinding<H>,
    current: AnimationState,
    fade: Option<CrossFade>,
    fade_duration: f32,
    time_scales: TimeScales,
    /// Time scale last applied to each bound clip.
    applied_scales: Vec<f32>,
}

impl<H: ClipPlayback> AnimationSelector<H> {
    /// Configure every bound clip and start idle at full weight.
    pub fn new(mut clips: ClipBinding<H>, settings: &AnimationSettings) -> Self {
        // A shared clip keeps the loop mode of the first state bound to it.
        let mut applied_scales = vec![f32::NAN; clips.handles.len()];
        for state in AnimationState::ALL {
            let slot = clips.slots[state.index()];
            if !applied_scales[slot].is_nan() {
                continue;
            }
            let scale = state.time_scale(&settings.time_scales);
            applied_scales[slot] = scale;
            let handle = clips.get_mut(state);
            handle.set_time_scale(scale);
            handle.set_loop(state.loop_mode());
        }

        let mut selector = AnimationSelector {
            clips,
            current: AnimationState::Idle,
            fade: None,
            fade_duration: settings.fade_duration,
            time_scales: settings.time_scales.clone(),
            applied_scales,
        };
        selector.apply_time_scale(AnimationState::Idle);
        selector.clips.get_mut(AnimationState::Idle).play();
        selector
    }

    pub fn current(&self) -> AnimationState {
        self.current
    }

    pub fn fade(&self) -> Option<&CrossFade> {
        self.fade.as_ref()
    }

    pub fn clips(&self) -> &ClipBinding<H> {
        &self.clips
    }

    pub fn handle(&self, state: AnimationState) -> &H {
        self.clips.get(state)
    }

    /// Switch to `next`, cross-fading from the current clip.
    ///
    /// Returns false and issues no commands when `next` is already current.
    pub fn request(&mut self, next: AnimationState) -> bool {
        if next == self.current {
            return false;
        }

        let previous = self.current;
        self.current = next;
        self.apply_time_scale(next);

        if self.clips.shares_clip(previous, next) {
            tracing::trace!("{:?} -> {:?} share a clip, no fade", previous, next);
            return true;
        }

        tracing::debug!("Animation {:?} -> {:?}", previous, next);
        self.clips.get_mut(previous).fade_out(self.fade_duration);
        let incoming = self.clips.get_mut(next);
        incoming.reset();
        incoming.fade_in(self.fade_duration);
        incoming.play();
        self.fade = Some(CrossFade::new(previous, next, self.fade_duration));
        true
    }

    /// Play the state's clip at the state's rate when another state
    /// sharing the clip last set a different one.
    fn apply_time_scale(&mut self, state: AnimationState) {
        let slot = self.clips.slots[state.index()];
        let scale = state.time_scale(&self.time_scales);
        if self.applied_scales[slot] != scale {
            self.applied_scales[slot] = scale;
            self.clips.get_mut(state).set_time_scale(scale);
        }
    }

    pub fn update(&mut self, dt: f32) {
        if let Some(fade) = self.fade.as_mut() {
            fade.advance(dt.max(0.0));
            if fade.is_finished() {
                self.fade = None;
            }
        }
    }

    /// Blend weight of a state's clip as tracked by the cross-fade record.
    pub fn weight(&self, state: AnimationState) -> f32 {
        match &self.fade {
            Some(fade) if fade.incoming.state == state => fade.incoming_weight(),
            Some(fade) if fade.outgoing.state == state => fade.outgoing_weight(),
            _ if state == self.current => 1.0,
            _ => 0.0,
        }
    }
}
