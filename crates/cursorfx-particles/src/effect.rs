//! The generic effect engine.
//!
//! Every effect runs the same loop: spawn from input, integrate and age the
//! live instances, resolve interactions, then compact into the upload
//! buffer. An `EffectKind` supplies only what differs: its instance and GPU
//! records, its configuration and its spawn / motion / pack functions.

use crate::animation::AnimationConfig;
use crate::instance::{Instance, InstancePool};
use crate::rand::ParticleRng;
use crate::upload::UploadBuffer;
use bytemuck::Pod;
use cursorfx_runtime::FrameInput;
use std::any::Any;
use tracing::debug;

/// Per-effect policy plugged into `Effect<K>`
pub trait EffectKind: Sized + 'static {
    type Instance: Instance;
    /// `#[repr(C)]` record read by the shader, a multiple of 16 bytes
    type Gpu: Pod;

    /// Settings table and shader name
    const NAME: &'static str;
    /// Pool and upload buffer capacity
    const HARD_MAX: usize;

    fn animation(&self) -> &AnimationConfig;

    /// Apply a flat settings table; unknown keys ignored, bad values clamped
    fn apply_settings(&mut self, table: &toml::value::Table);

    /// Current configuration as a settings table
    fn settings_toml(&self) -> toml::Value;

    /// Create this tick's new instances
    fn spawn(&mut self, input: &FrameInput, ctx: &mut SpawnContext<'_, Self::Instance>);

    /// Motion and per-tick visual state of one live instance. Aging and
    /// animation run after this in the engine.
    fn integrate(&self, instance: &mut Self::Instance, input: &FrameInput);

    /// Interactions between instances after integration
    fn resolve(&mut self, _pool: &mut InstancePool<Self::Instance>, _input: &FrameInput) {}

    fn pack(&self, instance: &Self::Instance) -> Self::Gpu;
}

/// What `EffectKind::spawn` may touch: the pool and the effect's generator
pub struct SpawnContext<'a, T: Instance> {
    pool: &'a mut InstancePool<T>,
    pub rng: &'a mut ParticleRng,
    spawned: u32,
}

impl<'a, T: Instance> SpawnContext<'a, T> {
    pub fn new(pool: &'a mut InstancePool<T>, rng: &'a mut ParticleRng) -> Self {
        Self {
            pool,
            rng,
            spawned: 0,
        }
    }

    pub fn live_count(&self) -> usize {
        self.pool.live_count()
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    /// Read access to the instances already in the pool
    pub fn pool(&self) -> &InstancePool<T> {
        self.pool
    }

    /// Write one instance into the pool, returning its slot
    pub fn emit(&mut self, instance: T) -> usize {
        self.spawned += 1;
        self.pool.spawn(instance)
    }

    pub fn spawned(&self) -> u32 {
        self.spawned
    }
}

/// One running effect: its policy, pool, upload buffer and random source
pub struct Effect<K: EffectKind> {
    pub kind: K,
    pool: InstancePool<K::Instance>,
    upload: UploadBuffer<K::Gpu>,
    rng: ParticleRng,
    spawned_total: u64,
}

impl<K: EffectKind> Effect<K> {
    pub fn new(kind: K, seed: u64) -> Self {
        Self {
            kind,
            pool: InstancePool::new(K::HARD_MAX),
            upload: UploadBuffer::new(K::HARD_MAX),
            rng: ParticleRng::new(seed),
            spawned_total: 0,
        }
    }

    /// One simulation tick
    pub fn update(&mut self, input: &FrameInput) {
        let dt = input.delta_time;
        if !dt.is_finite() || dt < 0.0 {
            return;
        }

        let mut ctx = SpawnContext::new(&mut self.pool, &mut self.rng);
        self.kind.spawn(input, &mut ctx);
        let spawned = ctx.spawned();
        if spawned > 0 {
            self.spawned_total += spawned as u64;
            debug!(effect = K::NAME, spawned, "spawn");
        }

        let kind = &self.kind;
        let anim = kind.animation();
        self.pool.for_each_live_mut(|_, instance| {
            kind.integrate(instance, input);
            instance.lifecycle_mut().advance(dt, anim);
        });

        self.kind.resolve(&mut self.pool, input);
    }

    /// Compact live instances into the upload buffer; returns the live count
    pub fn pack(&mut self) -> usize {
        let kind = &self.kind;
        self.upload.compact(&self.pool, |instance| kind.pack(instance))
    }

    pub fn apply_settings(&mut self, table: &toml::value::Table) {
        self.kind.apply_settings(table);
    }

    /// Write an instance directly, bypassing spawn control
    pub fn insert(&mut self, instance: K::Instance) -> usize {
        self.spawned_total += 1;
        self.pool.spawn(instance)
    }

    pub fn pool(&self) -> &InstancePool<K::Instance> {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut InstancePool<K::Instance> {
        &mut self.pool
    }

    pub fn upload(&self) -> &UploadBuffer<K::Gpu> {
        &self.upload
    }

    pub fn live_count(&self) -> usize {
        self.pool.live_count()
    }

    pub fn spawned_total(&self) -> u64 {
        self.spawned_total
    }

    /// Kill every instance and zero the upload buffer
    pub fn clear(&mut self) {
        self.pool.clear();
        self.upload.clear();
    }
}

/// Object-safe view of an `Effect<K>` for heterogeneous effect stacks
pub trait DynEffect {
    fn name(&self) -> &'static str;
    fn hard_max(&self) -> usize;
    fn record_size(&self) -> usize;
    fn update(&mut self, input: &FrameInput);
    fn pack(&mut self) -> usize;
    fn live_count(&self) -> usize;
    fn packed_count(&self) -> usize;
    fn spawned_total(&self) -> u64;
    fn upload_bytes(&self) -> &[u8];
    fn apply_settings(&mut self, table: &toml::value::Table);
    fn settings_toml(&self) -> toml::Value;
    fn clear(&mut self);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<K: EffectKind> DynEffect for Effect<K> {
    fn name(&self) -> &'static str {
        K::NAME
    }

    fn hard_max(&self) -> usize {
        K::HARD_MAX
    }

    fn record_size(&self) -> usize {
        std::mem::size_of::<K::Gpu>()
    }

    fn update(&mut self, input: &FrameInput) {
        Effect::update(self, input);
    }

    fn pack(&mut self) -> usize {
        Effect::pack(self)
    }

    fn live_count(&self) -> usize {
        Effect::live_count(self)
    }

    fn packed_count(&self) -> usize {
        self.upload.count()
    }

    fn spawned_total(&self) -> u64 {
        self.spawned_total
    }

    fn upload_bytes(&self) -> &[u8] {
        self.upload.as_bytes()
    }

    fn apply_settings(&mut self, table: &toml::value::Table) {
        Effect::apply_settings(self, table);
    }

    fn settings_toml(&self) -> toml::Value {
        self.kind.settings_toml()
    }

    fn clear(&mut self) {
        Effect::clear(self);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
