use super::backbone::{FeatureExtractor, FeatureExtractorConfig};
use burn::{
    config::Config,
    module::Module,
    nn::{
        Dropout, DropoutConfig, Linear, LinearConfig, Relu,
        pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig},
    },
    tensor::{Tensor, activation::softmax, backend::Backend},
};

#[derive(Config, Debug)]
pub struct LeafClassifierConfig {
    pub num_classes: usize,
    pub backbone: FeatureExtractorConfig,
    #[config(default = 256)]
    pub dense1_units: usize,
    #[config(default = 0.5)]
    pub dense1_dropout: f64,
    #[config(default = 128)]
    pub dense2_units: usize,
    #[config(default = 0.3)]
    pub dense2_dropout: f64,
}

impl LeafClassifierConfig {
    /// Returns a model with a freshly initialized, frozen feature extractor.
    pub fn init<B: Backend>(&self, device: &B::Device) -> LeafClassifier<B> {
        self.init_with_backbone(self.backbone.init(device), device)
    }

    /// Attaches a new dense head to `backbone` and freezes the backbone.
    pub fn init_with_backbone<B: Backend>(
        &self,
        backbone: FeatureExtractor<B>,
        device: &B::Device,
    ) -> LeafClassifier<B> {
        LeafClassifier {
            backbone: backbone.no_grad(),
            pool: AdaptiveAvgPool2dConfig::new([1, 1]).init(),
            dense1: LinearConfig::new(self.backbone.out_channels(), self.dense1_units).init(device),
            dropout1: DropoutConfig::new(self.dense1_dropout).init(),
            dense2: LinearConfig::new(self.dense1_units, self.dense2_units).init(device),
            dropout2: DropoutConfig::new(self.dense2_dropout).init(),
            output: LinearConfig::new(self.dense2_units, self.num_classes).init(device),
            relu: Relu::new(),
        }
    }
}

/// Frozen feature extractor followed by a trainable dense head.
#[derive(Module, Debug)]
pub struct LeafClassifier<B: Backend> {
    backbone: FeatureExtractor<B>,
    pool: AdaptiveAvgPool2d,
    dense1: Linear<B>,
    dropout1: Dropout,
    dense2: Linear<B>,
    dropout2: Dropout,
    output: Linear<B>,
    relu: Relu,
}

impl<B: Backend> LeafClassifier<B> {
    /// # Shapes
    ///   - Images `[batch, 3, H, W]`, values in `[0, 1]`
    ///   - Output logits `[batch, num_classes]`
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        // [0, 1] -> [-1, 1], the range the feature extractor expects
        let x = images.mul_scalar(2.0).sub_scalar(1.0);

        let x = self.backbone.forward(x);
        let x = self.pool.forward(x);
        let [batch_size, channels, _, _] = x.dims();
        let x = x.reshape([batch_size, channels]);

        let x = self.relu.forward(self.dense1.forward(x));
        let x = self.dropout1.forward(x);
        let x = self.relu.forward(self.dense2.forward(x));
        let x = self.dropout2.forward(x);

        self.output.forward(x)
    }

    /// Softmax over the class dimension.
    pub fn forward_probabilities(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        softmax(self.forward(images), 1)
    }
}
