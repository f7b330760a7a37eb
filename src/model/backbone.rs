use burn::{
    config::Config,
    module::Module,
    nn::{
        PaddingConfig2d, Relu,
        conv::{Conv2d, Conv2dConfig},
    },
    tensor::{Tensor, backend::Backend},
};

/// Channel widths of the feature extractor. The first entry is the stem
/// output; each further entry adds one stride-2 separable block.
#[derive(Config, Debug)]
pub struct FeatureExtractorConfig {
    pub widths: Vec<usize>,
    #[config(default = 3)]
    pub in_channels: usize,
}

impl FeatureExtractorConfig {
    /// Layout used for 224px leaf photos: 224 -> 112 -> 56 -> 28 -> 14 -> 7.
    pub fn standard() -> Self {
        Self::new(vec![32, 64, 128, 256, 512])
    }

    pub fn out_channels(&self) -> usize {
        self.widths.last().copied().unwrap_or(self.in_channels)
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> FeatureExtractor<B> {
        let stem_width = self.widths.first().copied().unwrap_or(self.in_channels);
        let stem = Conv2dConfig::new([self.in_channels, stem_width], [3, 3])
            .with_stride([2, 2])
            .with_padding(PaddingConfig2d::Explicit(1, 1))
            .init(device);

        let blocks = self
            .widths
            .windows(2)
            .map(|pair| SeparableBlock::new(pair[0], pair[1], device))
            .collect();

        FeatureExtractor {
            stem,
            blocks,
            relu: Relu::new(),
        }
    }
}

/// Depthwise 3x3 (stride 2) followed by a pointwise 1x1 projection.
#[derive(Module, Debug)]
pub struct SeparableBlock<B: Backend> {
    depthwise: Conv2d<B>,
    pointwise: Conv2d<B>,
    relu: Relu,
}

impl<B: Backend> SeparableBlock<B> {
    fn new(in_channels: usize, out_channels: usize, device: &B::Device) -> Self {
        let depthwise = Conv2dConfig::new([in_channels, in_channels], [3, 3])
            .with_stride([2, 2])
            .with_padding(PaddingConfig2d::Explicit(1, 1))
            .with_groups(in_channels)
            .init(device);
        let pointwise = Conv2dConfig::new([in_channels, out_channels], [1, 1]).init(device);

        Self {
            depthwise,
            pointwise,
            relu: Relu::new(),
        }
    }

    fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.relu.forward(self.depthwise.forward(x));
        self.relu.forward(self.pointwise.forward(x))
    }
}

/// Convolutional feature extractor. Weights come from a pretrained record and
/// stay frozen while the dense head trains.
#[derive(Module, Debug)]
pub struct FeatureExtractor<B: Backend> {
    stem: Conv2d<B>,
    blocks: Vec<SeparableBlock<B>>,
    relu: Relu,
}

impl<B: Backend> FeatureExtractor<B> {
    /// # Shapes
    ///   - Images `[batch, 3, H, W]`, values in `[-1, 1]`
    ///   - Output `[batch, out_channels, H / 2^n, W / 2^n]`
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 4> {
        let mut x = self.relu.forward(self.stem.forward(images));
        for block in &self.blocks {
            x = block.forward(x);
        }
        x
    }
}
