use bevy::prelude::Resource;
use bevy::time::Timer;
use crossbeam_channel::Receiver;

use crate::store::Incoming;

#[derive(Resource)]
pub struct RecordsRx(pub Receiver<Incoming>);

#[derive(Resource)]
pub struct PlaybackClock(pub Timer);
