//! Sprite-frame selection
//!
//! The simulation never draws. It only decides which frame sequence is
//! current (by facing, or the attack sequence while attacking) and steps the
//! frame counter on a fixed seconds-per-frame cadence.

use serde::{Deserialize, Serialize};

use super::actor::Facing;

/// Which sequence family is playing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AnimState {
    #[default]
    Walk,
    Attack,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Animation {
    /// Walk frames indexed by `Facing::index`
    walk: [Vec<u32>; 4],
    attack: Vec<u32>,
    pub state: AnimState,
    current: usize,
    /// Seconds each frame stays on screen
    pub frame_seconds: f32,
    elapsed: f32,
}

impl Animation {
    /// No frames at all (invisible emitters)
    pub fn none() -> Self {
        Self::default()
    }

    /// Same walk sequence `0..count` in every direction
    pub fn uniform(count: u32, frame_seconds: f32) -> Self {
        Self::looping((0..count).collect(), frame_seconds)
    }

    /// The given walk sequence in every direction
    pub fn looping(frames: Vec<u32>, frame_seconds: f32) -> Self {
        Self {
            walk: [frames.clone(), frames.clone(), frames.clone(), frames],
            frame_seconds,
            ..Self::default()
        }
    }

    pub fn with_attack(mut self, frames: Vec<u32>) -> Self {
        self.attack = frames;
        self
    }

    fn sequence(&self, facing: Facing) -> &[u32] {
        if self.state == AnimState::Attack && !self.attack.is_empty() {
            &self.attack
        } else {
            &self.walk[facing.index()]
        }
    }

    /// Advance the frame clock. Attack sequences drop back to walking when
    /// they wrap.
    pub fn advance(&mut self, facing: Facing, dt: f32) {
        let len = self.sequence(facing).len();
        if len == 0 {
            return;
        }
        self.elapsed += dt;
        if self.elapsed >= self.frame_seconds {
            self.elapsed = 0.0;
            self.current = (self.current + 1) % len;
            if self.state == AnimState::Attack && self.current == 0 {
                self.state = AnimState::Walk;
            }
        }
    }

    /// Restart from the first attack frame
    pub fn start_attack(&mut self) {
        self.state = AnimState::Attack;
        self.current = 0;
        self.elapsed = 0.0;
    }

    pub fn frame_index(&self) -> usize {
        self.current
    }

    /// Sprite-sheet frame to draw, if the current sequence has any
    pub fn frame(&self, facing: Facing) -> Option<u32> {
        let seq = self.sequence(facing);
        seq.get(self.current % seq.len().max(1)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_wraps() {
        let mut anim = Animation::uniform(3, 0.1);
        for _ in 0..3 {
            anim.advance(Facing::Left, 0.1);
        }
        assert_eq!(anim.frame_index(), 0);
        anim.advance(Facing::Left, 0.1);
        assert_eq!(anim.frame(Facing::Left), Some(1));
    }

    #[test]
    fn test_attack_returns_to_walk() {
        let mut anim = Animation::uniform(4, 0.1).with_attack(vec![104, 106, 107]);
        anim.start_attack();
        assert_eq!(anim.frame(Facing::Right), Some(104));
        anim.advance(Facing::Right, 0.1);
        anim.advance(Facing::Right, 0.1);
        assert_eq!(anim.state, AnimState::Attack);
        anim.advance(Facing::Right, 0.1);
        assert_eq!(anim.state, AnimState::Walk);
        assert_eq!(anim.frame(Facing::Right), Some(0));
    }

    #[test]
    fn test_empty_animation_is_inert() {
        let mut anim = Animation::none();
        anim.advance(Facing::Down, 1.0);
        assert_eq!(anim.frame(Facing::Down), None);
    }
}
