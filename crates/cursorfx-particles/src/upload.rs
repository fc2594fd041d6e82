//! Dense GPU upload array built from the sparse pool every frame

use crate::instance::{Instance, InstancePool};
use bytemuck::{Pod, Zeroable};

/// `capacity` GPU records; the first `count` are the live instances in slot
/// order, the rest are zero so the shader discards them.
pub struct UploadBuffer<G: Pod> {
    records: Vec<G>,
    count: usize,
}

impl<G: Pod> UploadBuffer<G> {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: vec![G::zeroed(); capacity.max(1)],
            count: 0,
        }
    }

    /// Rebuild from `pool`; returns the live count written.
    ///
    /// Pure function of the pool: compacting twice yields identical bytes.
    pub fn compact<T: Instance>(
        &mut self,
        pool: &InstancePool<T>,
        mut pack: impl FnMut(&T) -> G,
    ) -> usize {
        let capacity = self.records.len();
        let mut gpu_index = 0;
        for instance in pool.iter_live() {
            if gpu_index >= capacity {
                break;
            }
            self.records[gpu_index] = pack(instance);
            gpu_index += 1;
        }
        self.records[gpu_index..].fill(G::zeroed());
        self.count = gpu_index;
        gpu_index
    }

    pub fn clear(&mut self) {
        self.records.fill(G::zeroed());
        self.count = 0;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn capacity(&self) -> usize {
        self.records.len()
    }

    /// Every record including the zeroed tail
    pub fn records(&self) -> &[G] {
        &self.records
    }

    pub fn live_records(&self) -> &[G] {
        &self.records[..self.count]
    }

    /// Full buffer as bytes, ready for a GPU upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{AnimationConfig, Lifecycle};

    #[derive(Clone, Default)]
    struct Dot {
        life: Lifecycle,
        size: f32,
    }

    impl Instance for Dot {
        fn lifecycle(&self) -> &Lifecycle {
            &self.life
        }
        fn lifecycle_mut(&mut self) -> &mut Lifecycle {
            &mut self.life
        }
    }

    #[repr(C)]
    #[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
    struct DotGpu {
        data: [f32; 4],
    }

    fn pack(d: &Dot) -> DotGpu {
        DotGpu {
            data: [d.size, d.life.lifetime, 0.0, 0.0],
        }
    }

    fn pool_with(lifetimes: &[f32]) -> InstancePool<Dot> {
        let mut pool = InstancePool::new(8);
        for (i, lifetime) in lifetimes.iter().enumerate() {
            pool.spawn(Dot {
                life: Lifecycle::new(*lifetime, &AnimationConfig::instant()),
                size: i as f32 + 1.0,
            });
        }
        pool
    }

    #[test]
    fn live_instances_packed_in_slot_order() {
        let pool = pool_with(&[1.0, 0.0, 2.0, 0.0, 3.0]);
        let mut upload = UploadBuffer::new(8);
        let count = upload.compact(&pool, pack);
        assert_eq!(count, 3);
        let sizes: Vec<f32> = upload.live_records().iter().map(|g| g.data[0]).collect();
        assert_eq!(sizes, vec![1.0, 3.0, 5.0]);
        assert!(upload.records()[3..].iter().all(|g| *g == DotGpu::zeroed()));
    }

    #[test]
    fn trailing_slots_cleared_when_instances_die() {
        let mut pool = pool_with(&[1.0, 1.0, 1.0]);
        let mut upload = UploadBuffer::new(8);
        upload.compact(&pool, pack);
        pool.for_each_live_mut(|slot, d| {
            if slot > 0 {
                d.life.kill();
            }
        });
        assert_eq!(upload.compact(&pool, pack), 1);
        assert_eq!(upload.records()[1], DotGpu::zeroed());
        assert_eq!(upload.records()[2], DotGpu::zeroed());
    }

    #[test]
    fn compaction_is_idempotent() {
        let pool = pool_with(&[0.5, 0.0, 1.5, 2.5, 0.0, 0.1]);
        let mut upload = UploadBuffer::new(8);
        upload.compact(&pool, pack);
        let first = upload.as_bytes().to_vec();
        upload.compact(&pool, pack);
        assert_eq!(first, upload.as_bytes());
    }

    #[test]
    fn count_capped_at_capacity() {
        let pool = pool_with(&[1.0; 8]);
        let mut upload: UploadBuffer<DotGpu> = UploadBuffer::new(4);
        assert_eq!(upload.compact(&pool, pack), 4);
        assert_eq!(upload.as_bytes().len(), 4 * 16);
    }
}
