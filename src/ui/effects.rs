use std::cell::Cell;
use std::f64::consts::PI;

use gtk4 as gtk;
use gtk4::prelude::*;
use rand::Rng;

use birthday_surprise::effects::{BurstConfig, Celebration, CONFETTI_COLORS};
use birthday_surprise::timeline::Timeline;

const PARTICLE_MS: f64 = 800.0;
const BASE_SPEED: f64 = 520.0;
const GRAVITY: f64 = 900.0;
const SPARKLE_COUNT: usize = 8;

struct Particle {
    label: gtk::Label,
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
}

/// Non-targetable layer on top of everything that hosts confetti.
pub struct SparkLayer {
    layer: gtk::Fixed,
}

impl SparkLayer {
    pub fn new() -> Self {
        let layer = gtk::Fixed::new();
        layer.set_hexpand(true);
        layer.set_vexpand(true);
        layer.set_can_target(false);
        layer.add_css_class("spark-layer");
        SparkLayer { layer }
    }

    pub fn widget(&self) -> &gtk::Fixed {
        &self.layer
    }

    pub fn launch(&self, timeline: Timeline<BurstConfig>) {
        for cue in timeline {
            if cue.at.is_zero() {
                spawn_confetti(&self.layer, &cue.event);
                continue;
            }
            let layer_weak = self.layer.downgrade();
            let config = cue.event;
            glib::timeout_add_local_once(cue.at, move || {
                if let Some(layer) = layer_weak.upgrade() {
                    spawn_confetti(&layer, &config);
                }
            });
        }
    }
}

impl Celebration for SparkLayer {
    fn burst(&self, config: &BurstConfig) {
        spawn_confetti(&self.layer, config);
    }
}

fn spawn_confetti(layer: &gtk::Fixed, config: &BurstConfig) {
    let (width, height) = (layer.width() as f64, layer.height() as f64);
    if width <= 0.0 || height <= 0.0 {
        tracing::debug!("confetti skipped: layer not allocated");
        return;
    }
    let palette: &[&str] = if config.colors.is_empty() {
        &CONFETTI_COLORS
    } else {
        &config.colors
    };

    let mut rng = rand::rng();
    let (ox, oy) = (config.origin.0 * width, config.origin.1 * height);
    let half_spread = config.spread_deg / 2.0;
    let particles: Vec<Particle> = (0..config.particles as usize)
        .map(|i| {
            let color = palette[i % palette.len()];
            let label = gtk::Label::new(None);
            label.set_markup(&format!("<span foreground=\"{color}\">●</span>"));
            label.add_css_class("confetti-particle");
            label.set_can_target(false);
            layer.put(&label, ox, oy);

            let angle = (config.angle_deg + rng.random_range(-half_spread..=half_spread)) * PI / 180.0;
            let speed = BASE_SPEED * config.scale * rng.random_range(0.45..1.0);
            Particle {
                label,
                x: ox,
                y: oy,
                vx: angle.cos() * speed,
                vy: -angle.sin() * speed,
            }
        })
        .collect();

    let started = Cell::new(None::<i64>);
    layer.add_tick_callback(move |layer, clock| {
        let now = clock.frame_time();
        let start = started.get().unwrap_or(now);
        started.set(Some(start));
        let secs = (now - start) as f64 / 1_000_000.0;
        let progress = secs * 1000.0 / PARTICLE_MS;

        if progress >= 1.0 {
            for particle in &particles {
                if particle.label.parent().is_some() {
                    layer.remove(&particle.label);
                }
            }
            return glib::ControlFlow::Break;
        }
        for particle in &particles {
            let x = particle.x + particle.vx * secs;
            let y = particle.y + particle.vy * secs + 0.5 * GRAVITY * secs * secs;
            layer.move_(&particle.label, x, y);
            particle.label.set_opacity(1.0 - progress * progress);
        }
        glib::ControlFlow::Continue
    });
}

/// Small star burst around a point, animated by CSS and dropped after it
/// finishes.
pub(super) fn spawn_sparkles(layer: &gtk::Fixed, x: f64, y: f64) {
    for i in 0..SPARKLE_COUNT {
        let sparkle = gtk::Label::builder()
            .label("✦")
            .css_classes(vec!["sparkle", &format!("dir-{i}"), &format!("color-{}", i % 4)])
            .build();
        sparkle.set_can_target(false);
        layer.put(&sparkle, x, y);

        glib::timeout_add_local_once(std::time::Duration::from_millis(PARTICLE_MS as u64), {
            let layer_weak = layer.downgrade();
            let sparkle_weak = sparkle.downgrade();
            move || {
                if let (Some(layer), Some(sparkle)) = (layer_weak.upgrade(), sparkle_weak.upgrade()) {
                    layer.remove(&sparkle);
                }
            }
        });
    }
}
