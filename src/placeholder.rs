//! Stand-in art drawn in code. Used whenever the player sheets or the farm map are not shipped
//! under `assets/`, so a bare checkout still renders a walkable farm.

use bevy::prelude::*;
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};

use crate::animation::FRAME_SIZE;

const BODY: u32 = 0x4a90e2;
const HEAD: u32 = 0xf5a623;
const GRASS: u32 = 0x7cb342;
const DIRT: u32 = 0x8d6e63;
const DARK_GRASS: u32 = 0x4caf50;
/// Width of the dirt path around the map edge, in tiles.
const BORDER_TILES: u32 = 5;

fn rgba(hex: u32) -> [u8; 4] {
    [(hex >> 16) as u8, (hex >> 8) as u8, hex as u8, 0xff]
}

/// Builds an sRGB image row by row from the top. `None` texels stay transparent.
fn paint(width: u32, height: u32, texel: impl Fn(u32, u32) -> Option<u32>) -> Image {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            data.extend_from_slice(&texel(x, y).map_or([0; 4], rgba));
        }
    }
    Image::new(
        Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        data,
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::default(),
    )
}

/// A horizontal strip of `frames` 32x32 farmer frames. Walking frames lift the body by 2px per
/// step of the four-frame cycle.
pub fn player_sheet(frames: u32, walking: bool) -> Image {
    paint(frames * FRAME_SIZE, FRAME_SIZE, |x, y| {
        let frame = x / FRAME_SIZE;
        let local = x % FRAME_SIZE;
        let lift = if walking { (frame % 4) * 2 } else { 0 };

        if (12..20).contains(&local) && (4..12).contains(&y) {
            Some(HEAD)
        } else if (8..24).contains(&local) && (8 + lift..FRAME_SIZE).contains(&y) {
            Some(BODY)
        } else {
            None
        }
    })
}

/// Tiles needed to cover `size` world pixels.
pub fn ground_tiles(size: Vec2, tile_size: f32) -> UVec2 {
    (size / tile_size).ceil().max(Vec2::ONE).as_uvec2()
}

/// One texel per tile: grass with diagonal dark patches inside a dirt border. Stretched over
/// the level with nearest sampling it reads as a tile map.
pub fn ground_map(tiles: UVec2) -> Image {
    paint(tiles.x, tiles.y, |x, y| {
        let border = x < BORDER_TILES
            || y < BORDER_TILES
            || x + BORDER_TILES >= tiles.x
            || y + BORDER_TILES >= tiles.y;
        Some(if border {
            DIRT
        } else if (x + y) % 7 == 0 {
            DARK_GRASS
        } else {
            GRASS
        })
    })
}
