pub type Mat = nalgebra::DMatrix<f64>;
pub type DVec = nalgebra::DVector<f64>;
pub type CsrMat = nalgebra_sparse::CsrMatrix<f64>;
