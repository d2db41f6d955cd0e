//! Host debug harness entry point.
//!
//! Builds two small in-memory RGB565 tiles, alpha-blends one into the
//! other through [`pix2d_core::Engine`] over [`pix2d_sim::NullBackend`],
//! and logs the result — a minimal stand-in for `pico-gs-pc`'s role as a
//! host without dedicated hardware attached.

use pix2d_core::op::IoType;
use pix2d_core::{Engine, OperationCore, Preference, RuntimeConfig};
use pix2d_hal::ColorFormat;
use pix2d_sim::{Framebuffer, NullBackend};

fn main() {
    env_logger::init();
    log::info!("pix2d-sim: host debug harness starting");

    let mut source = Framebuffer::new(4, 1, ColorFormat::Rgb565);
    source.pixels.copy_from_slice(&[
        0x00, 0xF8, // 0xF800, red
        0xE0, 0x07, // 0x07E0, green
        0x1F, 0x00, // 0x001F, blue
        0xFF, 0xFF, // 0xFFFF, white
    ]);
    let mut target = Framebuffer::new(4, 1, ColorFormat::Rgb565);

    let config = RuntimeConfig::default();
    let mut engine: Engine<NullBackend, 4> = Engine::new(NullBackend, config);

    let mut op = OperationCore::new(IoType::Copy, Preference::SwOnly);
    let status = {
        let source_tile = source.tile();
        let target_tile = target.tile();
        engine.alpha_blend_rgb565(&mut op, &source_tile, &target_tile, None, 128)
    };

    log::info!("blend status: {:?}", status);
    log::info!("target bytes: {:02x?}", target.pixels);
    log::info!("pix2d-sim: done");
}
