use sdl2::pixels::PixelFormatEnum;

use chip8vm_core::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use chip8vm_core::FrameBuffer;

/// Bytes per RGB24 pixel
const CHANNELS: usize = 3;

/// # Display
/// The Chip-8 display is composed of 64x32 black/white pixels.
/// The on/off state of these pixels is encoded as 1/0 respectively in a 2d array.
/// The display only gets a call to `render` when the Chip-8 FrameBuffer is updated.
pub struct Display {
    canvas: sdl2::render::WindowCanvas,
}

impl Display {
    /// Creates a new display object bound to an sdl2 context.
    ///
    /// # Arguments
    /// * `sdl` an sdl2 context with which to draw
    /// * `title` the window title
    /// * `scale` the size multiplier for each pixel
    pub fn new(sdl: &sdl2::Sdl, title: &str, scale: u32) -> Result<Self, String> {
        let video_subsystem = sdl.video()?;
        let window = video_subsystem
            .window(
                title,
                DISPLAY_WIDTH as u32 * scale,
                DISPLAY_HEIGHT as u32 * scale,
            )
            .position_centered()
            .build()
            .map_err(|e| e.to_string())?;
        let canvas = window
            .into_canvas()
            .accelerated()
            .build()
            .map_err(|e| e.to_string())?;

        let mut display = Display { canvas };
        display.render(&[[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT])?;
        Ok(display)
    }

    /// Formats a Chip-8 FrameBuffer as rows of RGB24 pixels.
    ///
    /// This creates a black and white rendering by:
    /// - Flattening the 2D frame buffer into a 1D array by concatenating its rows
    /// - Triplicating each element of that 1D array to represent the RGB values of each pixel
    /// - Mapping lit pixels to full intensity
    ///
    /// # Arguments
    /// * `frame` a Chip-8 FrameBuffer
    pub fn frame_to_rgb24(frame: &FrameBuffer) -> Vec<u8> {
        frame
            .iter()
            .flat_map(|row| row.iter())
            .map(|&pixel| if pixel == 0 { 0x00 } else { 0xFF })
            .flat_map(|intensity| std::iter::repeat(intensity).take(CHANNELS))
            .collect()
    }

    /// Formats the Chip-8 FrameBuffer as an SDL2 RGB24 texture and renders it.
    ///
    /// # Arguments
    /// * `frame` a Chip-8 FrameBuffer
    pub fn render(&mut self, frame: &FrameBuffer) -> Result<(), String> {
        let texture_creator = self.canvas.texture_creator();

        let mut texture = texture_creator
            .create_texture_streaming(
                PixelFormatEnum::RGB24,
                DISPLAY_WIDTH as u32,
                DISPLAY_HEIGHT as u32,
            )
            .map_err(|e| e.to_string())?;

        let pixels = Display::frame_to_rgb24(frame);
        texture.with_lock(None, |buffer: &mut [u8], pitch: usize| {
            for (y, row) in pixels.chunks(DISPLAY_WIDTH * CHANNELS).enumerate() {
                buffer[y * pitch..y * pitch + row.len()].copy_from_slice(row);
            }
        })?;

        self.canvas.copy(&texture, None, None)?;
        self.canvas.present();
        Ok(())
    }
}
