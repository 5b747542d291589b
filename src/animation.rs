//! Player animation clips. Picks one of the eight `{idle,walk}_{direction}` clips from the
//! motion state and steps through its frames on a sprite atlas.

use std::time::Duration;

use bevy::prelude::*;

use crate::config::asset_available;
use crate::direction::Facing;
use crate::movement::Motion;
use crate::placeholder;
use crate::state::{GameSet, GameState};

/// Frames are 32x32 in both sheets.
pub const FRAME_SIZE: u32 = 32;
const IDLE_FRAMES: u32 = 4;
const WALK_FRAMES: u32 = 16;
const IDLE_SHEET: &str = "textures/player_idle.png";
const WALK_SHEET: &str = "textures/player_walk.png";

pub struct AnimationPlugin;

impl Plugin for AnimationPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, load_player_sheets).add_systems(
            Update,
            animate_player
                .in_set(GameSet::Effects)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sheet {
    Idle,
    Walk,
}

/// Frame range and playback rate of one clip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipFrames {
    pub sheet: Sheet,
    pub first: usize,
    pub last: usize,
    pub fps: f32,
}

impl ClipFrames {
    pub fn len(&self) -> usize {
        self.last - self.first + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClipId {
    Idle(Facing),
    Walk(Facing),
}

impl ClipId {
    pub fn select(facing: Facing, is_moving: bool) -> Self {
        if is_moving {
            ClipId::Walk(facing)
        } else {
            ClipId::Idle(facing)
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ClipId::Idle(Facing::Up) => "idle_up",
            ClipId::Idle(Facing::Down) => "idle_down",
            ClipId::Idle(Facing::Left) => "idle_left",
            ClipId::Idle(Facing::Right) => "idle_right",
            ClipId::Walk(Facing::Up) => "walk_up",
            ClipId::Walk(Facing::Down) => "walk_down",
            ClipId::Walk(Facing::Left) => "walk_left",
            ClipId::Walk(Facing::Right) => "walk_right",
        }
    }

    pub fn frames(self) -> ClipFrames {
        let idle = |frame: usize| ClipFrames {
            sheet: Sheet::Idle,
            first: frame,
            last: frame,
            fps: 1.0,
        };
        let walk = |first: usize| ClipFrames {
            sheet: Sheet::Walk,
            first,
            last: first + 3,
            fps: 8.0,
        };

        match self {
            ClipId::Idle(Facing::Down) => idle(0),
            ClipId::Idle(Facing::Left) => idle(1),
            ClipId::Idle(Facing::Right) => idle(2),
            ClipId::Idle(Facing::Up) => idle(3),
            ClipId::Walk(Facing::Down) => walk(0),
            ClipId::Walk(Facing::Left) => walk(4),
            ClipId::Walk(Facing::Right) => walk(8),
            ClipId::Walk(Facing::Up) => walk(12),
        }
    }
}

/// Plays looping clips. Switching to the clip already playing does not restart it.
#[derive(Component, Debug, Clone)]
pub struct SpriteAnimator {
    clip: ClipId,
    frame: usize,
    timer: Timer,
}

impl SpriteAnimator {
    pub fn new(clip: ClipId) -> Self {
        Self {
            clip,
            frame: 0,
            timer: Timer::from_seconds(1.0 / clip.frames().fps, TimerMode::Repeating),
        }
    }

    /// Switches clips. Returns `true` if the clip changed.
    pub fn play(&mut self, clip: ClipId) -> bool {
        if clip == self.clip {
            return false;
        }
        *self = Self::new(clip);
        true
    }

    /// Advances playback and returns the atlas index to show.
    pub fn tick(&mut self, delta: Duration) -> usize {
        self.timer.tick(delta);
        let frames = self.clip.frames();
        let steps = self.timer.times_finished_this_tick() as usize;
        self.frame = (self.frame + steps) % frames.len();
        self.index()
    }

    pub fn index(&self) -> usize {
        self.clip.frames().first + self.frame
    }
}

/// Texture and atlas handles for the idle and walk sheets.
#[derive(Resource, Clone)]
pub struct PlayerSheets {
    pub idle_texture: Handle<Image>,
    pub idle_layout: Handle<TextureAtlasLayout>,
    pub walk_texture: Handle<Image>,
    pub walk_layout: Handle<TextureAtlasLayout>,
}

impl PlayerSheets {
    pub fn sheet(&self, sheet: Sheet) -> (Handle<Image>, Handle<TextureAtlasLayout>) {
        match sheet {
            Sheet::Idle => (self.idle_texture.clone(), self.idle_layout.clone()),
            Sheet::Walk => (self.walk_texture.clone(), self.walk_layout.clone()),
        }
    }
}

/// The shipped sheet at `path`, or a drawn stand-in with the same frame grid.
fn sheet_texture(
    asset_server: &AssetServer,
    images: &mut Assets<Image>,
    path: &'static str,
    frames: u32,
    walking: bool,
) -> Handle<Image> {
    if asset_available(path) {
        asset_server.load(path)
    } else {
        info!("{path} not found; using placeholder frames");
        images.add(placeholder::player_sheet(frames, walking))
    }
}

fn load_player_sheets(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut images: ResMut<Assets<Image>>,
    mut layouts: ResMut<Assets<TextureAtlasLayout>>,
) {
    let frame = UVec2::splat(FRAME_SIZE);
    commands.insert_resource(PlayerSheets {
        idle_texture: sheet_texture(&asset_server, &mut images, IDLE_SHEET, IDLE_FRAMES, false),
        idle_layout: layouts.add(TextureAtlasLayout::from_grid(
            frame,
            IDLE_FRAMES,
            1,
            None,
            None,
        )),
        walk_texture: sheet_texture(&asset_server, &mut images, WALK_SHEET, WALK_FRAMES, true),
        walk_layout: layouts.add(TextureAtlasLayout::from_grid(
            frame,
            WALK_FRAMES,
            1,
            None,
            None,
        )),
    });
}

/// Swaps clips when facing or movement changes and advances the atlas frame.
fn animate_player(
    time: Res<Time>,
    sheets: Res<PlayerSheets>,
    mut query: Query<(
        &Motion,
        &mut SpriteAnimator,
        &mut Handle<Image>,
        &mut TextureAtlas,
    )>,
) {
    for (motion, mut animator, mut texture, mut atlas) in &mut query {
        let clip = ClipId::select(motion.facing(), motion.is_moving());
        if animator.play(clip) {
            debug!("Player clip -> {}", clip.name());
            let (image, layout) = sheets.sheet(clip.frames().sheet);
            *texture = image;
            atlas.layout = layout;
        }
        atlas.index = animator.tick(time.delta());
    }
}

#[cfg(test)]
mod tests {
    use bevy::asset::AssetPlugin;

    use super::*;

    #[test]
    fn sheets_resolve_without_shipped_textures() {
        assert!(!asset_available(IDLE_SHEET) && !asset_available(WALK_SHEET));

        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()))
            .init_asset::<Image>()
            .init_asset::<TextureAtlasLayout>()
            .add_systems(Startup, load_player_sheets);
        app.update();

        let sheets = app.world().resource::<PlayerSheets>();
        let images = app.world().resource::<Assets<Image>>();
        let layouts = app.world().resource::<Assets<TextureAtlasLayout>>();
        for (sheet, frames) in [(Sheet::Idle, IDLE_FRAMES), (Sheet::Walk, WALK_FRAMES)] {
            let (texture, layout) = sheets.sheet(sheet);
            let image = images.get(&texture).unwrap();
            assert_eq!(image.width(), frames * FRAME_SIZE);
            assert_eq!(layouts.get(&layout).unwrap().textures.len(), frames as usize);
        }
    }

    #[test]
    fn selection_covers_all_eight_clips() {
        assert_eq!(ClipId::select(Facing::Left, true).name(), "walk_left");
        assert_eq!(ClipId::select(Facing::Down, false).name(), "idle_down");
        assert_eq!(ClipId::select(Facing::Up, false).frames().first, 3);
        assert_eq!(ClipId::select(Facing::Right, true).frames().first, 8);
        assert_eq!(ClipId::Walk(Facing::Up).frames().last, 15);
    }

    #[test]
    fn walk_cycles_through_four_frames() {
        let mut animator = SpriteAnimator::new(ClipId::Walk(Facing::Right));
        assert_eq!(animator.index(), 8);

        let frame = Duration::from_millis(125);
        let indices: Vec<usize> = (0..5).map(|_| animator.tick(frame)).collect();
        assert_eq!(indices, vec![9, 10, 11, 8, 9]);
    }

    #[test]
    fn replaying_the_same_clip_keeps_progress() {
        let mut animator = SpriteAnimator::new(ClipId::Walk(Facing::Down));
        animator.tick(Duration::from_millis(260));
        assert_eq!(animator.index(), 2);

        assert!(!animator.play(ClipId::Walk(Facing::Down)));
        assert_eq!(animator.index(), 2);

        assert!(animator.play(ClipId::Idle(Facing::Down)));
        assert_eq!(animator.index(), 0);
    }
}
