//! Independent trackers for several faces in the same stream.
//!
//! Each face keeps its own [`LandmarkTracker`]; nothing is shared between
//! tracks. A track whose id is missing from a frame continues on its motion
//! model until it has been missing for more than `max_missed_frames` frames.

use crate::{
    config::{TrackerConfig, TracksConfig},
    filters::kalman::LandmarkTracker,
    landmarks::LandmarkSet,
    Error, Result,
};
use log::{debug, warn};
use std::collections::BTreeMap;

/// Identifier the caller assigns to a face
pub type TrackId = u64;

#[derive(Debug)]
struct Track {
    tracker: LandmarkTracker,
    missed: u32,
}

/// Registry of per-face landmark trackers
#[derive(Debug)]
pub struct TrackRegistry {
    tracker_config: TrackerConfig,
    max_missed_frames: u32,
    tracks: BTreeMap<TrackId, Track>,
}

impl TrackRegistry {
    /// Create an empty registry
    ///
    /// # Errors
    ///
    /// Returns a configuration error if trackers cannot be built from `tracker_config`
    pub fn new(tracker_config: TrackerConfig, tracks_config: TracksConfig) -> Result<Self> {
        // Fail here instead of on the first new face
        LandmarkTracker::new(tracker_config)?;

        Ok(Self {
            tracker_config,
            max_missed_frames: tracks_config.max_missed_frames,
            tracks: BTreeMap::new(),
        })
    }

    /// Process one frame of per-face detections
    ///
    /// Returns the smoothed landmarks of every live track. A tracker that
    /// fails numerically is reset and its raw detection is returned for
    /// this frame instead.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if any detection has a non-finite coordinate;
    /// no track is advanced in that case
    pub fn update(&mut self, detections: &BTreeMap<TrackId, LandmarkSet>) -> Result<BTreeMap<TrackId, LandmarkSet>> {
        if let Some((id, index)) = detections
            .iter()
            .find_map(|(id, set)| set.first_non_finite().map(|index| (id, index)))
        {
            return Err(Error::InvalidInput(format!(
                "Track {id}: landmark {index} has a non-finite coordinate"
            )));
        }

        let mut output = BTreeMap::new();
        let mut expired = Vec::new();

        for (&id, track) in &mut self.tracks {
            match detections.get(&id) {
                Some(set) => {
                    track.missed = 0;
                    output.insert(id, Self::step_or_fallback(id, &mut track.tracker, set)?);
                }
                None => {
                    track.missed += 1;
                    if track.missed > self.max_missed_frames {
                        expired.push(id);
                    } else {
                        output.insert(id, track.tracker.step(None)?);
                    }
                }
            }
        }

        for id in expired {
            self.tracks.remove(&id);
            debug!("Dropped track {id} after {} missed frames", self.max_missed_frames + 1);
        }

        for (&id, set) in detections {
            if self.tracks.contains_key(&id) {
                continue;
            }
            let mut tracker = LandmarkTracker::new(self.tracker_config)?;
            let smoothed = Self::step_or_fallback(id, &mut tracker, set)?;
            self.tracks.insert(id, Track { tracker, missed: 0 });
            output.insert(id, smoothed);
            debug!("Started track {id}");
        }

        Ok(output)
    }

    fn step_or_fallback(id: TrackId, tracker: &mut LandmarkTracker, set: &LandmarkSet) -> Result<LandmarkSet> {
        match tracker.step(Some(set)) {
            Ok(smoothed) => Ok(smoothed),
            Err(e @ (Error::NumericalError(_) | Error::TrackerDiverged(_))) => {
                warn!("Track {id}: {e}; resetting and using raw detection");
                tracker.reset();
                Ok(set.clone())
            }
            Err(e) => Err(e),
        }
    }

    /// Number of live tracks
    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// True when no track is live
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// True when `id` is a live track
    #[must_use]
    pub fn contains(&self, id: TrackId) -> bool {
        self.tracks.contains_key(&id)
    }

    /// Ids of live tracks in ascending order
    pub fn track_ids(&self) -> impl Iterator<Item = TrackId> + '_ {
        self.tracks.keys().copied()
    }

    /// Tracker of a live track
    #[must_use]
    pub fn tracker(&self, id: TrackId) -> Option<&LandmarkTracker> {
        self.tracks.get(&id).map(|track| &track.tracker)
    }

    /// Drop one track; returns whether it existed
    pub fn remove(&mut self, id: TrackId) -> bool {
        self.tracks.remove(&id).is_some()
    }

    /// Drop every track
    pub fn clear(&mut self) {
        self.tracks.clear();
    }
}
