//! Decorative "particle network" background.
//!
//! A fixed set of particles drifts across the surface. Every frame the
//! surface is dimmed with a translucent fill (leaving fading trails), each
//! particle is drawn as a dot and linked to every other particle closer than
//! [`ParticleConfig::link_distance`]. Link opacity falls off linearly with
//! distance. The all-pairs pass is O(n²), which is fine for the default 60
//! particles and is what makes every close pair visible.

use std::fmt;

use rand::Rng;

use crate::config::ParticleConfig;

/// HSLA color as understood by canvas style strings
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsla {
    pub hue: u16,
    pub saturation: u32,
    pub lightness: u32,
    pub alpha: f64,
}

impl fmt::Display for Hsla {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "hsla({},{}%,{}%,{})",
            self.hue, self.saturation, self.lightness, self.alpha
        )
    }
}

/// Drawing target of the animation
pub trait Surface {
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: &str);
    fn draw_point(&mut self, x: f64, y: f64, radius: f64, color: Hsla);
    fn draw_line(&mut self, from: (f64, f64), to: (f64, f64), color: Hsla);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    /// `0..360`
    pub hue: u16,
}

impl Particle {
    fn random<R: Rng + ?Sized>(width: f64, height: f64, speed: f64, rng: &mut R) -> Self {
        Particle {
            x: rng.random::<f64>() * width,
            y: rng.random::<f64>() * height,
            vx: (rng.random::<f64>() - 0.5) * speed,
            vy: (rng.random::<f64>() - 0.5) * speed,
            hue: rng.random_range(0..360),
        }
    }

    // a particle past an edge always heads back inside, even if the
    // surface shrank under it
    fn advance(&mut self, width: f64, height: f64) {
        self.x += self.vx;
        self.y += self.vy;
        if self.x < 0.0 {
            self.vx = self.vx.abs();
        } else if self.x > width {
            self.vx = -self.vx.abs();
        }
        if self.y < 0.0 {
            self.vy = self.vy.abs();
        } else if self.y > height {
            self.vy = -self.vy.abs();
        }
    }
}

pub struct ParticleField {
    particles: Vec<Particle>,
    width: f64,
    height: f64,
    cfg: ParticleConfig,
    frames: u64,
}

impl ParticleField {
    /// Scatters `cfg.count` particles uniformly over the surface
    pub fn new<R: Rng + ?Sized>(width: f64, height: f64, cfg: &ParticleConfig, rng: &mut R) -> Self {
        let particles = (0..cfg.count)
            .map(|_| Particle::random(width, height, cfg.speed, rng))
            .collect();
        Self::from_particles(width, height, cfg, particles)
    }

    pub fn from_particles(width: f64, height: f64, cfg: &ParticleConfig, particles: Vec<Particle>) -> Self {
        ParticleField {
            particles,
            width,
            height,
            cfg: cfg.clone(),
            frames: 0,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Changes the surface size. The particle set is kept; particles
    /// outside the new bounds are moved onto the nearest edge
    pub fn resize(&mut self, width: f64, height: f64) {
        log::debug!("particle field resized to {}x{}", width, height);
        self.width = width;
        self.height = height;
        for p in &mut self.particles {
            p.x = p.x.clamp(0.0, width.max(0.0));
            p.y = p.y.clamp(0.0, height.max(0.0));
        }
    }

    fn color(&self, hue: u16, alpha: f64) -> Hsla {
        Hsla {
            hue,
            saturation: self.cfg.saturation,
            lightness: self.cfg.lightness,
            alpha,
        }
    }

    /// Draws one frame and moves every particle one step.
    ///
    /// Particles are handled in order: a particle is drawn, linked to the
    /// others (some of which have already moved this frame) and then moved.
    pub fn frame<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        surface.fill_rect(0.0, 0.0, self.width, self.height, &self.cfg.trail_color);

        let link = self.cfg.link_distance;
        for i in 0..self.particles.len() {
            let p = self.particles[i];
            surface.draw_point(p.x, p.y, self.cfg.point_radius, self.color(p.hue, self.cfg.point_alpha));

            for (j, q) in self.particles.iter().enumerate() {
                if i == j {
                    continue;
                }
                let (dx, dy) = (p.x - q.x, p.y - q.y);
                let d = (dx * dx + dy * dy).sqrt();
                if d < link {
                    let alpha = (link - d) / self.cfg.alpha_divisor;
                    surface.draw_line((p.x, p.y), (q.x, q.y), self.color(p.hue, alpha));
                }
            }

            self.particles[i].advance(self.width, self.height);
        }

        self.frames += 1;
        log::trace!("particle frame {}", self.frames);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[derive(Default)]
    struct Recorder {
        fills: Vec<String>,
        points: Vec<(f64, f64)>,
        lines: Vec<((f64, f64), (f64, f64), Hsla)>,
    }

    impl Surface for Recorder {
        fn fill_rect(&mut self, _x: f64, _y: f64, _w: f64, _h: f64, color: &str) {
            self.fills.push(color.to_string());
        }

        fn draw_point(&mut self, x: f64, y: f64, _radius: f64, _color: Hsla) {
            self.points.push((x, y));
        }

        fn draw_line(&mut self, from: (f64, f64), to: (f64, f64), color: Hsla) {
            self.lines.push((from, to, color));
        }
    }

    struct Null;

    impl Surface for Null {
        fn fill_rect(&mut self, _x: f64, _y: f64, _w: f64, _h: f64, _color: &str) {}
        fn draw_point(&mut self, _x: f64, _y: f64, _radius: f64, _color: Hsla) {}
        fn draw_line(&mut self, _from: (f64, f64), _to: (f64, f64), _color: Hsla) {}
    }

    fn still(x: f64, y: f64, hue: u16) -> Particle {
        Particle {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            hue,
        }
    }

    #[test]
    fn test_init() {
        let cfg = ParticleConfig::default();
        let mut rng = SmallRng::seed_from_u64(7);
        let field = ParticleField::new(800.0, 600.0, &cfg, &mut rng);
        assert_eq!(field.particles().len(), 60);
        for p in field.particles() {
            assert!(p.x >= 0.0 && p.x <= 800.0);
            assert!(p.y >= 0.0 && p.y <= 600.0);
            assert!(p.vx >= -0.3 && p.vx < 0.3);
            assert!(p.vy >= -0.3 && p.vy < 0.3);
            assert!(p.hue < 360);
        }
    }

    #[test]
    fn test_links() {
        let cfg = ParticleConfig::default();
        let particles = vec![still(10.0, 10.0, 0), still(40.0, 50.0, 200), still(500.0, 500.0, 100)];
        let mut field = ParticleField::from_particles(800.0, 600.0, &cfg, particles);
        let mut rec = Recorder::default();
        field.frame(&mut rec);

        assert_eq!(rec.fills, vec!["rgba(2,6,23,0.12)".to_string()]);
        assert_eq!(rec.points.len(), 3);
        // both directions of the close pair, nothing for the far particle
        assert_eq!(rec.lines.len(), 2);
        let (from, to, color) = rec.lines[0];
        assert_eq!(from, (10.0, 10.0));
        assert_eq!(to, (40.0, 50.0));
        assert_eq!(color.hue, 0);
        assert!((color.alpha - 0.35).abs() < 1e-12);
        assert_eq!(rec.lines[1].2.hue, 200);
        assert_eq!(field.frames(), 1);
    }

    #[test]
    fn test_link_threshold() {
        let cfg = ParticleConfig::default();
        let particles = vec![still(0.0, 0.0, 0), still(120.0, 0.0, 0), still(0.0, 119.0, 0)];
        let mut field = ParticleField::from_particles(800.0, 600.0, &cfg, particles);
        let mut rec = Recorder::default();
        field.frame(&mut rec);
        // only the pair at distance 119 is linked
        assert_eq!(rec.lines.len(), 2);
        assert!((rec.lines[0].2.alpha - 0.005).abs() < 1e-12);
    }

    #[test]
    fn test_color() {
        let c = Hsla {
            hue: 42,
            saturation: 90,
            lightness: 60,
            alpha: 0.95,
        };
        assert_eq!(c.to_string(), "hsla(42,90%,60%,0.95)");
    }

    #[test]
    fn test_reflection() {
        let cfg = ParticleConfig::default();
        let p = Particle {
            x: 99.9,
            y: 0.1,
            vx: 0.3,
            vy: -0.3,
            hue: 0,
        };
        let mut field = ParticleField::from_particles(100.0, 100.0, &cfg, vec![p]);
        field.frame(&mut Null);
        let p = field.particles()[0];
        assert!(p.vx < 0.0);
        assert!(p.vy > 0.0);
        field.frame(&mut Null);
        let p = field.particles()[0];
        assert!(p.x <= 100.0 && p.y >= 0.0);
    }

    #[test]
    fn test_bounds() {
        let cfg = ParticleConfig::default();
        let mut rng = SmallRng::seed_from_u64(42);
        let (w, h) = (320.0, 240.0);
        let mut field = ParticleField::new(w, h, &cfg, &mut rng);
        for _ in 0..5000 {
            field.frame(&mut Null);
            for p in field.particles() {
                assert!(p.x >= -p.vx.abs() && p.x <= w + p.vx.abs(), "{:?}", p);
                assert!(p.y >= -p.vy.abs() && p.y <= h + p.vy.abs(), "{:?}", p);
            }
        }
    }

    #[test]
    fn test_resize() {
        let cfg = ParticleConfig::default();
        let mut rng = SmallRng::seed_from_u64(3);
        let mut field = ParticleField::new(1000.0, 1000.0, &cfg, &mut rng);
        field.resize(100.0, 50.0);
        assert_eq!(field.size(), (100.0, 50.0));
        assert_eq!(field.particles().len(), 60);
        for _ in 0..100 {
            for p in field.particles() {
                assert!(p.x >= -0.3 && p.x <= 100.3);
                assert!(p.y >= -0.3 && p.y <= 50.3);
            }
            field.frame(&mut Null);
        }
    }
}
