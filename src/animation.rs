/// Animation clips ride along with imported entities and are re-emitted on
/// export; the editor itself never samples them.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationInterpolation {
    Linear,
    Step,
}

/// Keyframe values for one animated property. Rotations are quaternions in
/// interchange order (x, y, z, w).
#[derive(Debug, Clone)]
pub enum ChannelValues {
    Translation(Vec<[f32; 3]>),
    Rotation(Vec<[f32; 4]>),
    Scale(Vec<[f32; 3]>),
}

impl ChannelValues {
    pub fn len(&self) -> usize {
        match self {
            ChannelValues::Translation(v) | ChannelValues::Scale(v) => v.len(),
            ChannelValues::Rotation(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One sampler/target pair. The target is the node name within the owning
/// entity's payload; channels whose target no longer exists at export time
/// are skipped.
#[derive(Debug, Clone)]
pub struct AnimationChannel {
    pub target: String,
    pub interpolation: AnimationInterpolation,
    pub times: Vec<f32>,
    pub values: ChannelValues,
}

#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    pub channels: Vec<AnimationChannel>,
}

impl AnimationClip {
    pub fn duration(&self) -> f32 {
        self.channels
            .iter()
            .flat_map(|channel| channel.times.last().copied())
            .fold(0.0, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_spans_longest_channel() {
        let clip = AnimationClip {
            name: "bob".to_string(),
            channels: vec![
                AnimationChannel {
                    target: "a".to_string(),
                    interpolation: AnimationInterpolation::Linear,
                    times: vec![0.0, 0.5],
                    values: ChannelValues::Translation(vec![[0.0; 3], [1.0, 0.0, 0.0]]),
                },
                AnimationChannel {
                    target: "b".to_string(),
                    interpolation: AnimationInterpolation::Step,
                    times: vec![0.0, 2.0],
                    values: ChannelValues::Scale(vec![[1.0; 3], [2.0; 3]]),
                },
            ],
        };
        assert_eq!(clip.duration(), 2.0);
    }
}
