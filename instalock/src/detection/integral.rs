//! Summed-area tables for O(1) window sums.

use image::GrayImage;

/// Integral image of pixel values and squared pixel values
pub struct Integral {
    stride: usize,
    sum: Vec<u64>,
    sq: Vec<u64>,
}

impl Integral {
    pub fn new(img: &GrayImage) -> Self {
        let (w, h) = (img.width() as usize, img.height() as usize);
        let stride = w + 1;
        let mut sum = vec![0u64; stride * (h + 1)];
        let mut sq = vec![0u64; stride * (h + 1)];
        let raw = img.as_raw();

        for y in 0..h {
            let mut row_sum = 0u64;
            let mut row_sq = 0u64;
            for x in 0..w {
                let p = raw[y * w + x] as u64;
                row_sum += p;
                row_sq += p * p;
                let idx = (y + 1) * stride + x + 1;
                sum[idx] = sum[idx - stride] + row_sum;
                sq[idx] = sq[idx - stride] + row_sq;
            }
        }

        Self { stride, sum, sq }
    }

    /// Sum and sum of squares over the `w` x `h` window at (`x`, `y`)
    pub fn window(&self, x: usize, y: usize, w: usize, h: usize) -> (u64, u64) {
        let a = y * self.stride + x;
        let b = a + w;
        let c = (y + h) * self.stride + x;
        let d = c + w;
        (
            self.sum[d] + self.sum[a] - self.sum[b] - self.sum[c],
            self.sq[d] + self.sq[a] - self.sq[b] - self.sq[c],
        )
    }
}
