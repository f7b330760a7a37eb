use super::dataset::Sample;
use crate::preprocess::CHANNELS;
use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

/// Images `[batch, 3, size, size]` with their class indices `[batch]`.
#[derive(Clone, Debug)]
pub struct ImageBatch<B: Backend> {
    pub images: Tensor<B, 4>,
    pub targets: Tensor<B, 1, Int>,
}

#[derive(Clone, Debug)]
pub struct ImageBatcher<B: Backend> {
    device: B::Device,
    image_size: usize,
}

impl<B: Backend> ImageBatcher<B> {
    pub fn new(device: B::Device, image_size: usize) -> Self {
        Self { device, image_size }
    }
}

impl<B: Backend> Batcher<Sample, ImageBatch<B>> for ImageBatcher<B> {
    fn batch(&self, items: Vec<Sample>) -> ImageBatch<B> {
        let batch_size = items.len();

        let images: Vec<f32> = items.iter().flat_map(|item| item.image.iter().copied()).collect();
        let images = Tensor::<B, 4>::from_data(
            TensorData::new(images, [batch_size, CHANNELS, self.image_size, self.image_size]),
            &self.device,
        );

        let targets: Vec<i64> = items.iter().map(|item| item.label as i64).collect();
        let targets = Tensor::<B, 1, Int>::from_data(TensorData::new(targets, [batch_size]), &self.device);

        ImageBatch { images, targets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InferenceBackend;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_batch_shapes() {
        let batcher = ImageBatcher::<InferenceBackend>::new(Default::default(), 4);
        let items = vec![
            Sample {
                image: vec![0.25; 3 * 4 * 4],
                label: 2,
            },
            Sample {
                image: vec![0.75; 3 * 4 * 4],
                label: 0,
            },
        ];

        let batch = batcher.batch(items);
        assert_eq!(batch.images.dims(), [2, 3, 4, 4]);
        assert_eq!(
            batch.targets.into_data().convert::<i64>().to_vec::<i64>().unwrap(),
            vec![2, 0]
        );
    }
}
