use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use kira::{
    AudioManager, DefaultBackend, AudioManagerSettings, Frame, Tween,
    sound::PlaybackState,
    sound::static_sound::{StaticSoundData, StaticSoundHandle, StaticSoundSettings},
};
use log::{debug, info};
use curtain_core::audio::{ChannelId, Tone, ToneSink};

/// Plays synthesized tones on the default output device.
pub struct KiraToneSink {
    manager: AudioManager<DefaultBackend>,
    active_channels: HashMap<ChannelId, Vec<StaticSoundHandle>>,
}

impl KiraToneSink {
    pub fn new() -> anyhow::Result<Self> {
        let manager = AudioManager::<DefaultBackend>::new(AudioManagerSettings::default())
            .map_err(|e| anyhow::anyhow!("Failed to initialize audio manager: {}", e))?;
        info!("Audio output ready");

        Ok(Self {
            manager,
            active_channels: HashMap::new(),
        })
    }

    fn prune(&mut self) {
        self.active_channels.retain(|_, handles| {
            handles.retain(|h| h.state() != PlaybackState::Stopped);
            !handles.is_empty()
        });
    }
}

fn frames_from_samples(samples: &[f32]) -> Arc<[Frame]> {
    samples.iter().map(|s| Frame::from_mono(*s)).collect()
}

impl ToneSink for KiraToneSink {
    fn submit(&mut self, channel: ChannelId, tone: &Tone) -> anyhow::Result<()> {
        if tone.samples.is_empty() {
            return Ok(());
        }
        self.prune();

        // Volume is already baked into the samples.
        let data = StaticSoundData {
            sample_rate: tone.sample_rate,
            frames: frames_from_samples(&tone.samples),
            settings: StaticSoundSettings::default(),
            slice: None,
        };

        let handle = self.manager.play(data)
            .map_err(|e| anyhow::anyhow!("Kira play error: {}", e))?;
        self.active_channels.entry(channel).or_default().push(handle);
        Ok(())
    }

    fn release(&mut self, channel: ChannelId) {
        if let Some(handles) = self.active_channels.remove(&channel) {
            for mut handle in handles {
                handle.stop(Tween {
                    duration: Duration::from_millis(10),
                    ..Default::default()
                });
            }
            debug!("Audio stopped [{:?}]", channel);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mono_samples_fill_both_sides() {
        let frames = frames_from_samples(&[0.5, -0.25]);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].left, 0.5);
        assert_eq!(frames[0].right, 0.5);
        assert_eq!(frames[1].right, -0.25);
    }
}
